//! Upload session bookkeeping.

use std::rc::Rc;

use rand::Rng;
use smol_str::SmolStr;

use crate::adapter::EditorAdapter;
use crate::classify::Category;
use crate::file::{FileHandle, unix_millis};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque identifier of one upload, embedded in its placeholder text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(SmolStr);

impl SessionId {
    /// Mint a fresh id: base36 unix millis, a dash, six random base36 chars.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut id = to_base36(unix_millis());
        id.push('-');
        for _ in 0..6 {
            id.push(BASE36[rng.random_range(0..BASE36.len())] as char);
        }
        SessionId(SmolStr::new(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId(SmolStr::new(s))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// One file's journey from placeholder to resolution.
pub struct UploadSession {
    pub id: SessionId,
    pub file: Rc<dyn FileHandle>,
    pub category: Category,
    /// Adapter the placeholder was inserted through.
    pub adapter: Rc<dyn EditorAdapter>,
    /// Exact placeholder text, without the surrounding block padding.
    pub placeholder: String,
}
