//! Validated newtypes shared across Wellspring crates.

mod email;
mod otp;
mod token;
mod user;

pub use email::{Email, EmailError};
pub use otp::{OtpCode, OtpError};
pub use token::{AccessToken, RefreshToken, TokenError};
pub use user::{UserId, UserProfile};
