pub mod ledger;
pub mod login;
