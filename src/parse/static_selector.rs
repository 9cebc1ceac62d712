use std::{ops::Deref, sync::OnceLock};

use regex::Regex;
use scraper::Selector;

/// Something compiled from a pattern literal.
pub(super) trait Compile: Sized {
    fn compile(pattern: &str) -> Result<Self, String>;
}

impl Compile for Selector {
    fn compile(pattern: &str) -> Result<Self, String> {
        Self::parse(pattern).map_err(|e| format!("{e:?}"))
    }
}

impl Compile for Regex {
    fn compile(pattern: &str) -> Result<Self, String> {
        Self::new(pattern).map_err(|e| e.to_string())
    }
}

/// A pattern literal compiled on first use and shared afterwards.
#[derive(Debug)]
pub(super) struct Static<T> {
    cell: OnceLock<T>,
    pattern: &'static str,
}

impl<T> Static<T> {
    pub(super) const fn new(pattern: &'static str) -> Self {
        Self {
            cell: OnceLock::new(),
            pattern,
        }
    }
}

impl<T: Compile> Deref for Static<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // patterns are literals, so a failure here is a typo in this crate
        self.cell.get_or_init(|| match T::compile(self.pattern) {
            Ok(compiled) => compiled,
            Err(e) => panic!("static pattern {:?} does not compile: {e}", self.pattern),
        })
    }
}

#[macro_export]
macro_rules! static_selector {
    ($x: ident <- $sel: literal) => {
        static $x: $crate::parse::static_selector::Static<::scraper::Selector> =
            $crate::parse::static_selector::Static::new($sel);
    };
}

#[macro_export]
macro_rules! static_regex {
    ($x: ident <- $pat: literal) => {
        static $x: $crate::parse::static_selector::Static<::regex::Regex> =
            $crate::parse::static_selector::Static::new($pat);
    };
}
