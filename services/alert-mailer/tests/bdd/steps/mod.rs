//! BDD step definitions for the alert mailer

pub mod dispatch_steps;
