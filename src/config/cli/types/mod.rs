//! CLI type enums for output formats and cluster options.

mod mail_type;
mod output_format;
mod quota_type;

#[cfg(test)]
mod tests;

pub use mail_type::MailType;
pub use output_format::OutputFormat;
pub use quota_type::QuotaType;
