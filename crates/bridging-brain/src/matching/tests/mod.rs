mod common;
mod knockout;
