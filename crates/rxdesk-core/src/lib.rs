//! RxDesk core: REST clients for the pharmacy back-office resources and the
//! list, form and transfer controllers the screens are built from.

pub mod config;
pub mod control;
pub mod error;
pub mod form;
pub mod list;
pub mod logging;
pub mod notice;
pub mod page;
pub mod purchase;
pub mod resource;
pub mod transfer;
pub mod transport;

#[cfg(test)]
mod test_support;
