use crate::uci::opts::{Opts, Val};
use anyhow::{Context, Result, bail};

fn do_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("empty name");
    }
    for c in name.chars() {
        let c = c as u32;
        if !(0x20..0x7f).contains(&c) {
            bail!("char out of range");
        }
    }
    if name.starts_with(' ') {
        bail!("string has leading space");
    }
    if name.ends_with(' ') {
        bail!("string has trailing space");
    }
    if name.contains("  ") {
        bail!("string has double spaces");
    }
    Ok(())
}

pub fn opt_name(name: &str) -> Result<()> {
    do_name(name)?;
    let low = name.to_ascii_lowercase();
    if low.contains("name") || low.contains("value") {
        bail!("string contains forbidden substrings");
    }
    Ok(())
}

pub fn val(val: &Val) -> Result<()> {
    match val {
        Val::Bool(_) | Val::Int(_) => {
            // Nothing to sanitize.
        }
        Val::Str(s) => {
            if s == "<empty>" {
                bail!("bad value \"<empty>\"");
            }
            for c in s.chars() {
                if c < ' ' || (c as u32) == 0x7f {
                    bail!("bad char");
                }
            }
        }
    }
    Ok(())
}

pub fn opts(opts: &Opts) -> Result<()> {
    for (name, v) in opts.iter() {
        opt_name(name).with_context(|| format!("in option {}", name))?;
        val(v).with_context(|| format!("in option {}", name))?;
    }
    Ok(())
}
