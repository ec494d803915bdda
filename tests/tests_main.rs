#[path = "helpers/mod.rs"]
mod helpers;

#[path = "expand/mod.rs"]
mod expand;

#[path = "scanner/mod.rs"]
mod scanner;
