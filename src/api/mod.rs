//! HTTP delivery: `GET /loan` for one loan, `POST /loan` for a portfolio.

pub mod dto;
pub mod server;
