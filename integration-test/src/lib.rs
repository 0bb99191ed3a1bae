//! Shared fixtures for argwise end-to-end tests.
//!
//! - [`args`]: split a command line the way a shell would, keeping quotes
//! - [`Slot`]: capture the last value a callback received
//! - [`TestEnum`], [`TestFlags`]: enumerated option types

use std::sync::{Arc, Mutex};

use argwise::ArgEnum;

/// Split a test command line into argument tokens.
///
/// Single quotes are rewritten to double quotes first, so cases can be
/// written inside ordinary string literals.
pub fn args(line: &str) -> Vec<String> {
    argwise::split_command_line(&line.replace('\'', "\"")).expect("test command line must split")
}

/// Holds the value most recently passed to a callback.
#[derive(Debug)]
pub struct Slot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Slot<T> {
    pub fn new() -> Self {
        Slot {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// A callback that stores its argument in this slot.
    pub fn setter(&self) -> impl Fn(T) + Send + Sync + 'static {
        let inner = self.inner.clone();
        move |v| *inner.lock().unwrap() = Some(v)
    }

    pub fn get(&self) -> Option<T> {
        self.inner.lock().unwrap().clone()
    }
}

impl<T: Clone + Send + 'static> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestEnum {
    Value0 = 0,
    Value1 = 1,
    Value2 = 2,
}

impl ArgEnum for TestEnum {
    const MEMBERS: &'static [(&'static str, i64)] = &[("Value0", 0), ("Value1", 1), ("Value2", 2)];

    fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(TestEnum::Value0),
            1 => Some(TestEnum::Value1),
            2 => Some(TestEnum::Value2),
            _ => None,
        }
    }

    fn to_raw(&self) -> i64 {
        *self as i64
    }
}

/// Bit-flag enum: any OR of the member values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestFlags(pub i64);

impl TestFlags {
    pub const VALUE0: TestFlags = TestFlags(0);
    pub const VALUE1: TestFlags = TestFlags(1);
    pub const VALUE2: TestFlags = TestFlags(2);
    pub const VALUE4: TestFlags = TestFlags(4);
    pub const VALUE8: TestFlags = TestFlags(8);
    pub const VALUE16: TestFlags = TestFlags(16);

    pub fn has_flag(&self, flag: TestFlags) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl ArgEnum for TestFlags {
    const MEMBERS: &'static [(&'static str, i64)] = &[
        ("Value0", 0),
        ("Value1", 1),
        ("Value2", 2),
        ("Value4", 4),
        ("Value8", 8),
        ("Value16", 16),
    ];
    const FLAGS: bool = true;

    fn from_raw(raw: i64) -> Option<Self> {
        Some(TestFlags(raw))
    }

    fn to_raw(&self) -> i64 {
        self.0
    }
}
