pub mod callers;
pub mod calls;
pub mod passcode;
pub mod webhooks;
