pub mod amortization;
pub mod interactive;
