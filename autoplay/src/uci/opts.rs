use std::fmt;

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Val {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Bool(v) => v.fmt(f),
            Val::Int(v) => v.fmt(f),
            Val::Str(v) if v.is_empty() => f.write_str("<empty>"),
            Val::Str(v) => f.write_str(v),
        }
    }
}

/// Engine options sent with `setoption` right after the handshake.
///
/// Names are compared case-insensitively, as engines do. Insertion order is
/// kept so that the commands go out in a predictable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Opts {
    items: Vec<(String, Val)>,
}

impl Opts {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set(&mut self, name: impl Into<String>, val: Val) {
        let name = name.into();
        match self
            .items
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(item) => item.1 = val,
            None => self.items.push((name, val)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Val> {
        self.items
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Val)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
