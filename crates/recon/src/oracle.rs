//! Oracle contract: the text-reasoning backend consulted for ambiguous groups.
//!
//! The engine only renders prompts and parses answers. Transport lives in
//! `hsmap-oracle`; tests use in-process fakes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use crate::digits::{decimal_value, is_decimal_digit};

/// One numbered option shown to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleOption<'a> {
    pub code: &'a str,
    pub description: &'a str,
}

/// Typed failure of a single oracle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The call exceeded its timeout.
    Timeout,
    /// Connection / transport failure.
    Transport(String),
    /// Non-success HTTP status.
    Http { status: u16, message: String },
    /// The backend answered with no text.
    EmptyResponse,
    /// The response body could not be decoded.
    Malformed(String),
    /// No usable backend configured.
    NotConfigured(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "oracle call timed out"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::EmptyResponse => write!(f, "empty response"),
            Self::Malformed(msg) => write!(f, "malformed response: {msg}"),
            Self::NotConfigured(msg) => write!(f, "oracle not configured: {msg}"),
        }
    }
}

impl std::error::Error for OracleError {}

/// A disambiguation backend. Exactly one attempt per call; retries are the
/// caller's business.
pub trait Oracle {
    fn choose(&self, product: &str, options: &[OracleOption<'_>]) -> Result<String, OracleError>;
}

impl<O: Oracle + ?Sized> Oracle for &O {
    fn choose(&self, product: &str, options: &[OracleOption<'_>]) -> Result<String, OracleError> {
        (**self).choose(product, options)
    }
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn choose(&self, product: &str, options: &[OracleOption<'_>]) -> Result<String, OracleError> {
        (**self).choose(product, options)
    }
}

/// Oracle that always fails; used when no backend is configured so every
/// ambiguous group takes the fallback path.
#[derive(Debug, Clone)]
pub struct DisabledOracle {
    pub reason: String,
}

impl Oracle for DisabledOracle {
    fn choose(&self, _product: &str, _options: &[OracleOption<'_>]) -> Result<String, OracleError> {
        Err(OracleError::NotConfigured(self.reason.clone()))
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Render the disambiguation prompt. Options are numbered from 1.
pub fn render_prompt(product: &str, options: &[OracleOption<'_>]) -> String {
    let listing = options
        .iter()
        .enumerate()
        .map(|(i, opt)| format!("{}. [{}] {}", i + 1, opt.code, opt.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "你是一名海关商品归类专家，请为下面的产品选出最合适的HS编码。\n\
         \n\
         产品名称: {product}\n\
         \n\
         候选编码:\n\
         {listing}\n\
         \n\
         规则:\n\
         1. 只回答所选选项的序号数字（1, 2, 3...），不要附加解释\n\
         2. 优先选择描述与产品名称最贴近的编码\n\
         3. 匹配程度接近时，选择位数更多、更具体的HS编码\n\
         4. 无法判断时，选择第2个选项\n\
         \n\
         你的选择（只写数字）:"
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// The last maximal run of decimal digits in `text`, as a number. Digits from
/// any script count, so a full-width `１` reads as 1.
///
/// Reasoning-style answers put explanation first and the final number last.
/// Runs too large for `usize` saturate, which keeps them out of any option range.
pub fn extract_last_number(text: &str) -> Option<usize> {
    let mut run: Vec<u32> = text
        .chars()
        .rev()
        .skip_while(|&c| !is_decimal_digit(c))
        .map_while(decimal_value)
        .collect();
    if run.is_empty() {
        return None;
    }
    run.reverse();

    let value = run.iter().try_fold(0usize, |acc, &d| {
        acc.checked_mul(10)?.checked_add(d as usize)
    });
    Some(value.unwrap_or(usize::MAX))
}

// ---------------------------------------------------------------------------
// Option-set cache
// ---------------------------------------------------------------------------

/// Memoises successful answers keyed by the ordered, whitespace-normalised
/// option list. Failures are not cached.
pub struct CachingOracle<O> {
    inner: O,
    cache: RefCell<HashMap<Vec<(String, String)>, String>>,
    hits: RefCell<usize>,
}

impl<O: Oracle> CachingOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
            hits: RefCell::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        *self.hits.borrow()
    }

    fn key(options: &[OracleOption<'_>]) -> Vec<(String, String)> {
        options
            .iter()
            .map(|o| (normalize(o.code), normalize(o.description)))
            .collect()
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl<O: Oracle> Oracle for CachingOracle<O> {
    fn choose(&self, product: &str, options: &[OracleOption<'_>]) -> Result<String, OracleError> {
        let key = Self::key(options);
        if let Some(answer) = self.cache.borrow().get(&key) {
            *self.hits.borrow_mut() += 1;
            log::debug!("oracle cache hit for '{product}'");
            return Ok(answer.clone());
        }

        let answer = self.inner.choose(product, options)?;
        self.cache.borrow_mut().insert(key, answer.clone());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn last_number_single() {
        assert_eq!(extract_last_number("仅有一个数字6"), Some(6));
    }

    #[test]
    fn last_number_last_run_wins() {
        assert_eq!(extract_last_number("先选1后来改选2"), Some(2));
        assert_eq!(extract_last_number("<think>options 1 and 3...</think>\n\n12"), Some(12));
    }

    #[test]
    fn last_number_full_width_and_other_scripts() {
        assert_eq!(extract_last_number("我选择第１个"), Some(1));
        assert_eq!(extract_last_number("２"), Some(2));
        assert_eq!(extract_last_number("选项１２"), Some(12));
        assert_eq!(extract_last_number("first 1, final ３"), Some(3));
        assert_eq!(extract_last_number("الخيار ٢"), Some(2));
    }

    #[test]
    fn last_number_none() {
        assert_eq!(extract_last_number("无法判断"), None);
        assert_eq!(extract_last_number(""), None);
    }

    #[test]
    fn last_number_at_start_and_overflow() {
        assert_eq!(extract_last_number("3 is my answer"), Some(3));
        assert_eq!(
            extract_last_number("99999999999999999999999999999999"),
            Some(usize::MAX)
        );
    }

    #[test]
    fn prompt_numbers_options_from_one() {
        let opts = [
            OracleOption { code: "7318.15", description: "Bolts" },
            OracleOption { code: "7318.16", description: "Nuts" },
        ];
        let prompt = render_prompt("不锈钢螺栓", &opts);
        assert!(prompt.contains("产品名称: 不锈钢螺栓"));
        assert!(prompt.contains("1. [7318.15] Bolts"));
        assert!(prompt.contains("2. [7318.16] Nuts"));
        assert!(!prompt.contains("0. ["));
    }

    struct Counting {
        calls: Cell<usize>,
        fail: bool,
    }

    impl Oracle for Counting {
        fn choose(&self, _p: &str, _o: &[OracleOption<'_>]) -> Result<String, OracleError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(OracleError::Timeout)
            } else {
                Ok("1".into())
            }
        }
    }

    #[test]
    fn cache_reuses_identical_option_sets() {
        let cached = CachingOracle::new(Counting { calls: Cell::new(0), fail: false });
        let a = [OracleOption { code: "01", description: "Live  horses" }];
        let b = [OracleOption { code: "01", description: "Live horses" }];
        cached.choose("p1", &a).unwrap();
        cached.choose("p2", &b).unwrap();
        assert_eq!(cached.inner.calls.get(), 1);
        assert_eq!(cached.hits(), 1);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let cached = CachingOracle::new(Counting { calls: Cell::new(0), fail: true });
        let a = [OracleOption { code: "01", description: "x" }];
        assert!(cached.choose("p", &a).is_err());
        assert!(cached.choose("p", &a).is_err());
        assert_eq!(cached.inner.calls.get(), 2);
    }

    #[test]
    fn disabled_oracle_fails() {
        let o = DisabledOracle { reason: "provider=none".into() };
        assert!(matches!(o.choose("p", &[]), Err(OracleError::NotConfigured(_))));
    }
}
