mod check;
mod env;
mod run;

pub use check::check;
pub use run::run;
