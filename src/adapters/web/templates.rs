//! HTML templates using Askama.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::domain::portfolio::Holding;
use crate::domain::records::Transaction;

/// Renders a template to a full HTML response, falling back to a bare
/// 500 if rendering itself fails.
pub struct Page<T: Template>(pub T);

impl<T: Template> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
        }
    }
}

#[derive(Template)]
#[template(path = "portfolio.html")]
pub struct PortfolioTemplate<'a> {
    pub holdings: &'a [Holding],
    pub cash: f64,
    pub grand_total: f64,
}

#[derive(Template)]
#[template(path = "buy.html")]
pub struct BuyTemplate;

#[derive(Template)]
#[template(path = "sell.html")]
pub struct SellTemplate<'a> {
    pub symbols: &'a [String],
}

#[derive(Template)]
#[template(path = "quote.html")]
pub struct QuoteTemplate;

#[derive(Template)]
#[template(path = "quoted.html")]
pub struct QuotedTemplate<'a> {
    pub name: &'a str,
    pub symbol: &'a str,
    pub price: f64,
}

#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate<'a> {
    pub transactions: &'a [Transaction],
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate<'a> {
    /// Empty string when there is nothing to report.
    pub error: &'a str,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate;

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}

pub mod filters {
    /// Format a dollar amount as `$1,234.56`.
    pub fn usd(value: &f64) -> askama::Result<String> {
        let negative = *value < 0.0;
        let cents = (value.abs() * 100.0).round() as i64;
        let dollars = cents / 100;
        let remainder = cents % 100;

        let digits = dollars.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        let sign = if negative { "-" } else { "" };
        Ok(format!("{sign}${grouped}.{remainder:02}"))
    }

    #[cfg(test)]
    mod tests {
        use super::usd;

        #[test]
        fn formats_with_thousands_separators() {
            assert_eq!(usd(&0.0).unwrap(), "$0.00");
            assert_eq!(usd(&9.5).unwrap(), "$9.50");
            assert_eq!(usd(&9_500.0).unwrap(), "$9,500.00");
            assert_eq!(usd(&1_234_567.891).unwrap(), "$1,234,567.89");
            assert_eq!(usd(&-42.0).unwrap(), "-$42.00");
        }
    }
}
