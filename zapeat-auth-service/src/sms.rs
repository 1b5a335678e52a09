use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
#[error("sms delivery failed: {0}")]
pub struct SmsError(pub String);

/// Delivers verification codes to phones.
pub trait SmsSender: Send + Sync + 'static {
    fn send(&self, mobile_number: &str, message: &str) -> Result<(), SmsError>;
}

/// Writes messages to the log instead of a carrier. Used for development.
#[derive(Default, Clone, Debug)]
pub struct LogSmsSender;

impl SmsSender for LogSmsSender {
    fn send(&self, mobile_number: &str, message: &str) -> Result<(), SmsError> {
        info!(%mobile_number, %message, "sms");
        Ok(())
    }
}

pub fn verification_message(code: &str, expires_in_minutes: i64) -> String {
    format!("Your ZapEat verification code is {code}. It expires in {expires_in_minutes} minutes.")
}
