#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Capability Header Artifact
//!
//! Text codec for the persisted configuration header. Rendering is
//! canonical: one `#undef` / `#define` pair per capability in table order,
//! with disabled capabilities kept as a commented-out define:
//!
//! ```text
//! #undef  HAVE_SERVER
//! // #define HAVE_SERVER
//! ```
//!
//! Parsing is strict and never falls back to defaults. A header missing
//! any capability block, its include guard or its closing `#endif` is
//! rejected as malformed. So is a file whose last line lacks its newline,
//! and any text following a `*/` on the same line.

use std::fmt::Write as _;

use crate::capability::{CAPABILITY_COUNT, Capability};
use crate::error::{ConfigError, Result};
use crate::selection::Selection;

/// Include guard used by [`ArtifactFormat::default`].
pub const DEFAULT_GUARD: &str = "MESALINK_OPTIONS_H";

/// Banner title used by [`ArtifactFormat::default`].
pub const DEFAULT_BANNER: &str = "MesaLink options.h";

const CPLUSPLUS_OPEN: [&str; 3] = ["#ifdef __cplusplus", "extern \"C\" {", "#endif"];
const CPLUSPLUS_CLOSE: [&str; 3] = ["#ifdef __cplusplus", "}", "#endif"];

/// Layout options for the rendered header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFormat {
    /// Include guard macro name.
    pub guard: String,
    /// First line of the leading comment block.
    pub banner: String,
    /// Wrap the directives in an `extern "C"` block for C++ includers.
    pub cxx_linkage: bool,
}

impl Default for ArtifactFormat {
    fn default() -> Self {
        Self {
            guard: DEFAULT_GUARD.to_string(),
            banner: DEFAULT_BANNER.to_string(),
            cxx_linkage: true,
        }
    }
}

impl ArtifactFormat {
    /// Create a format with the default guard and banner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the include guard.
    #[must_use]
    pub fn with_guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = guard.into();
        self
    }

    /// Set the banner title.
    #[must_use]
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Enable or disable the `extern "C"` wrapper.
    #[must_use]
    pub fn with_cxx_linkage(mut self, enabled: bool) -> Self {
        self.cxx_linkage = enabled;
        self
    }

    /// Check that the guard is a usable C identifier and the banner
    /// cannot terminate the comment block early.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedArtifact`] describing the bad field.
    pub fn validate(&self) -> Result<()> {
        if !is_c_identifier(&self.guard) {
            return Err(ConfigError::malformed(
                None,
                format!("include guard `{}` is not a C identifier", self.guard),
            ));
        }
        if self.banner.contains("*/") || self.banner.contains('\n') {
            return Err(ConfigError::malformed(None, "banner must be a single comment line"));
        }
        Ok(())
    }

    /// Render `selection` as header bytes.
    ///
    /// The caller is responsible for `selection` being valid; this only
    /// lays out text.
    #[must_use]
    pub fn render(&self, selection: &Selection) -> Vec<u8> {
        let mut out = String::with_capacity(1024);
        // Writing into a String cannot fail.
        let _ = self.write_into(&mut out, selection);
        out.into_bytes()
    }

    fn write_into(&self, out: &mut String, selection: &Selection) -> std::fmt::Result {
        writeln!(out, "/* {}", self.banner)?;
        writeln!(out, " * generated from configure options")?;
        writeln!(out, " *")?;
        writeln!(out, " * This file is part of MesaLink.")?;
        writeln!(out, " *")?;
        writeln!(out, " */")?;
        writeln!(out)?;
        writeln!(out, "#ifndef {}", self.guard)?;
        writeln!(out, "#define {}", self.guard)?;
        writeln!(out)?;
        writeln!(out)?;

        if self.cxx_linkage {
            for line in CPLUSPLUS_OPEN {
                writeln!(out, "{line}")?;
            }
            writeln!(out)?;
        }

        for (capability, enabled) in selection.iter() {
            let symbol = capability.symbol();
            writeln!(out, "#undef  {symbol}")?;
            if enabled {
                writeln!(out, "#define {symbol}")?;
            } else {
                writeln!(out, "// #define {symbol}")?;
            }
            writeln!(out)?;
        }

        if self.cxx_linkage {
            writeln!(out)?;
            for line in CPLUSPLUS_CLOSE {
                writeln!(out, "{line}")?;
            }
            writeln!(out)?;
        }

        writeln!(out)?;
        writeln!(out, "#endif /* {} */", self.guard)?;
        writeln!(out)
    }
}

fn is_c_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// One meaningful line of the header after comments and blanks are stripped.
#[derive(Debug, PartialEq, Eq)]
enum Directive<'a> {
    IfNDef(&'a str),
    IfDef(&'a str),
    Define(&'a str),
    CommentedDefine(&'a str),
    Undef(&'a str),
    EndIf,
    ExternOpen,
    ExternClose,
}

fn classify(line: &str) -> Option<Directive<'_>> {
    if let Some(rest) = line.strip_prefix("//") {
        let name = rest.trim_start().strip_prefix("#define")?;
        return single_word(name).map(Directive::CommentedDefine);
    }
    if line == "extern \"C\" {" {
        return Some(Directive::ExternOpen);
    }
    if line == "}" {
        return Some(Directive::ExternClose);
    }
    if let Some(rest) = line.strip_prefix("#endif") {
        return endif_trailer_ok(rest).then_some(Directive::EndIf);
    }
    let (keyword, rest) = line.split_once(char::is_whitespace)?;
    let name = single_word(rest)?;
    match keyword {
        "#ifndef" => Some(Directive::IfNDef(name)),
        "#ifdef" => Some(Directive::IfDef(name)),
        "#define" => Some(Directive::Define(name)),
        "#undef" => Some(Directive::Undef(name)),
        _ => None,
    }
}

/// `#endif` may only be followed by whitespace and one closed `/* */` comment.
fn endif_trailer_ok(rest: &str) -> bool {
    if rest.is_empty() {
        return true;
    }
    if !rest.starts_with(char::is_whitespace) {
        return false;
    }
    let comment = rest.trim();
    comment.is_empty()
        || comment
            .strip_prefix("/*")
            .and_then(|c| c.strip_suffix("*/"))
            .is_some_and(|body| !body.contains("*/"))
}

fn single_word(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty() && !s.contains(char::is_whitespace)).then_some(s)
}

/// Yields `(line_number, trimmed_line)` for every non-blank line outside
/// a leading `/* ... */` comment block.
fn significant_lines(text: &str) -> Result<Vec<(usize, &str)>> {
    let mut lines = Vec::new();
    let mut in_comment: Option<usize> = None;

    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let line = raw.trim();

        if in_comment.is_some() {
            if let Some((_, after)) = line.split_once("*/") {
                in_comment = None;
                reject_after_comment(number, after)?;
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(body) = line.strip_prefix("/*") {
            match body.split_once("*/") {
                Some((_, after)) => reject_after_comment(number, after)?,
                None => in_comment = Some(number),
            }
            continue;
        }
        lines.push((number, line));
    }

    if let Some(start) = in_comment {
        return Err(ConfigError::malformed(Some(start), "unterminated comment block"));
    }
    Ok(lines)
}

/// Text after a closing `*/` would be seen by the preprocessor but not by
/// a line-oriented reader, so it is refused.
fn reject_after_comment(number: usize, after: &str) -> Result<()> {
    if after.trim().is_empty() {
        Ok(())
    } else {
        Err(ConfigError::malformed(
            Some(number),
            format!("unexpected text after comment: `{}`", after.trim()),
        ))
    }
}

/// Parse header bytes into raw capability values.
///
/// The result is *not* validated against invariants; see
/// [`CapabilitySet::deserialize`](crate::CapabilitySet::deserialize).
///
/// # Errors
///
/// - [`ConfigError::MalformedArtifact`] for any structural problem,
///   including missing or duplicate capability blocks.
/// - [`ConfigError::UnknownCapability`] for a directive naming an
///   unrecognized symbol.
pub fn parse(bytes: &[u8]) -> Result<Selection> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ConfigError::malformed(None, format!("artifact is not UTF-8: {e}")))?;
    let lines = significant_lines(text)?;

    // A truncated file loses its closing `#endif` first; reject that before
    // any symbol lookup so a cut-off name is not mistaken for an unknown one.
    match lines.last() {
        Some((_, last)) if matches!(classify(last), Some(Directive::EndIf)) => {}
        Some((n, _)) => {
            return Err(ConfigError::malformed(Some(*n), "missing closing `#endif` at end of file"));
        }
        None => return Err(ConfigError::malformed(None, "artifact is empty")),
    }
    if !text.ends_with('\n') {
        return Err(ConfigError::malformed(
            Some(text.lines().count()),
            "missing newline at end of file",
        ));
    }

    let mut iter = lines.into_iter();

    let guard = match iter.next() {
        Some((n, line)) => match classify(line) {
            Some(Directive::IfNDef(guard)) => {
                match iter.next().map(|(m, l)| (m, classify(l))) {
                    Some((_, Some(Directive::Define(defined)))) if defined == guard => {}
                    Some((m, _)) => {
                        return Err(ConfigError::malformed(
                            Some(m),
                            format!("expected `#define {guard}` after include guard"),
                        ));
                    }
                    None => {
                        return Err(ConfigError::malformed(Some(n), "truncated after include guard"));
                    }
                }
                guard
            }
            _ => return Err(ConfigError::malformed(Some(n), "expected `#ifndef` include guard")),
        },
        None => return Err(ConfigError::malformed(None, "artifact is empty")),
    };

    let mut selection = Selection::none();
    let mut seen = [false; CAPABILITY_COUNT];
    let mut pending: Option<(usize, Capability)> = None;
    let mut extern_open = false;
    let mut closed_at: Option<usize> = None;

    while let Some((n, line)) = iter.next() {
        if let Some(end) = closed_at {
            return Err(ConfigError::malformed(
                Some(n),
                format!("content after closing `#endif` on line {end}"),
            ));
        }

        let directive = classify(line).ok_or_else(|| {
            ConfigError::malformed(Some(n), format!("unrecognized line `{line}`"))
        })?;

        if let Some((undef_line, capability)) = pending.take() {
            let value = match directive {
                Directive::Define(sym) if sym == capability.symbol() => true,
                Directive::CommentedDefine(sym) if sym == capability.symbol() => false,
                _ => {
                    return Err(ConfigError::malformed(
                        Some(n),
                        format!(
                            "`#undef {}` on line {undef_line} must be followed by its define",
                            capability.symbol()
                        ),
                    ));
                }
            };
            selection.set(capability, value);
            continue;
        }

        match directive {
            Directive::Undef(symbol) => {
                let capability = Capability::from_symbol(symbol)?;
                if seen[capability.index()] {
                    return Err(ConfigError::malformed(
                        Some(n),
                        format!("duplicate directive for `{symbol}`"),
                    ));
                }
                seen[capability.index()] = true;
                pending = Some((n, capability));
            }
            Directive::Define(symbol) | Directive::CommentedDefine(symbol) => {
                // An unknown name is reported as such even without its `#undef`.
                Capability::from_symbol(symbol)?;
                return Err(ConfigError::malformed(
                    Some(n),
                    format!("`#define {symbol}` without preceding `#undef`"),
                ));
            }
            Directive::IfDef("__cplusplus") => {
                let body = iter.next().and_then(|(_, l)| classify(l));
                let end = iter.next().and_then(|(_, l)| classify(l));
                match (body, end) {
                    (Some(Directive::ExternOpen), Some(Directive::EndIf)) if !extern_open => {
                        extern_open = true;
                    }
                    (Some(Directive::ExternClose), Some(Directive::EndIf)) if extern_open => {
                        extern_open = false;
                    }
                    _ => {
                        return Err(ConfigError::malformed(
                            Some(n),
                            "unbalanced `#ifdef __cplusplus` linkage block",
                        ));
                    }
                }
            }
            Directive::EndIf => {
                if extern_open {
                    return Err(ConfigError::malformed(
                        Some(n),
                        "include guard closed inside `extern \"C\"` block",
                    ));
                }
                closed_at = Some(n);
            }
            other => {
                return Err(ConfigError::malformed(
                    Some(n),
                    format!("unexpected directive {other:?}"),
                ));
            }
        }
    }

    if let Some((n, capability)) = pending {
        return Err(ConfigError::malformed(
            Some(n),
            format!("truncated after `#undef {}`", capability.symbol()),
        ));
    }
    if closed_at.is_none() {
        return Err(ConfigError::malformed(
            None,
            format!("missing closing `#endif` for include guard `{guard}`"),
        ));
    }
    if let Some(missing) = Capability::ALL.into_iter().find(|c| !seen[c.index()]) {
        return Err(ConfigError::malformed(
            None,
            format!("no directive for `{}`", missing.symbol()),
        ));
    }

    Ok(selection)
}
