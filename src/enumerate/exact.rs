//! Exact-arity cases
//!
//! The selection's `(C, T, Q)` counts are matched against an ordered pattern
//! table; the first match alone produces candidates. A type a pattern does not
//! name must have no selected fields.

use log::debug;

use crate::enumerate::builders::CaseBuilder;
use crate::enumerate::Buckets;
use crate::error::Result;
use crate::field::FieldSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Zero,
    One,
    Many,
    AtLeastOne,
}

impl Arity {
    fn matches(self, n: usize) -> bool {
        match self {
            Arity::Zero => n == 0,
            Arity::One => n == 1,
            Arity::Many => n > 1,
            Arity::AtLeastOne => n >= 1,
        }
    }
}

type Build = fn(&mut CaseBuilder<'_>, &Buckets<'_>) -> Result<()>;

struct Pattern {
    name: &'static str,
    c: Arity,
    t: Arity,
    q: Arity,
    build: Build,
}

use Arity::{AtLeastOne, Many, One, Zero};

const fn pattern(name: &'static str, c: Arity, t: Arity, q: Arity, build: Build) -> Pattern {
    Pattern { name, c, t, q, build }
}

/// Patterns in priority order
///
/// Multi-type multi-field first, then single-with-multi, then same-type
/// multi-field, then single-with-single. `T=1 ∧ Q>1` is listed for
/// completeness but never wins over `T≥1 ∧ Q>1`.
static PATTERNS: [Pattern; 17] = [
    pattern("C>1 T>1 Q>1", Many, Many, Many, |b, s| {
        each_c_pair(b, s, |b, x, y| s.q.iter().try_for_each(|q| b.c_c_q(x, y, q)))?;
        for c in &s.c {
            for t in &s.t {
                s.q.iter().try_for_each(|q| b.c_t_q(c, t, q))?;
            }
        }
        Ok(())
    }),
    pattern("C>1 T>1", Many, Many, Zero, |b, s| {
        each_c_pair(b, s, |b, x, y| b.c_c(x, y))?;
        for c in &s.c {
            s.t.iter().try_for_each(|t| b.c_t(c, t))?;
        }
        Ok(())
    }),
    pattern("C>1 Q>1", Many, Zero, Many, |b, s| {
        s.c.iter().try_for_each(|c| b.c_multi_q(c, &s.q))?;
        each_c_pair(b, s, |b, x, y| s.q.iter().try_for_each(|q| b.c_c_q(x, y, q)))
    }),
    pattern("T>=1 Q>1", Zero, AtLeastOne, Many, |b, s| {
        for t in &s.t {
            b.t_multi_q(t, &s.q)?;
            s.q.iter().try_for_each(|q| b.t_q(t, q))?;
        }
        Ok(())
    }),
    pattern("C=1 T>1", One, Many, Zero, |b, s| {
        s.t.iter().try_for_each(|t| b.c_t(s.c[0], t))?;
        each_pair(b, &s.t, |b, x, y| b.t_t(x, y))
    }),
    pattern("C=1 Q>1", One, Zero, Many, |b, s| {
        b.c_multi_q(s.c[0], &s.q)?;
        s.q.iter().try_for_each(|q| b.c_q(s.c[0], q))?;
        each_pair(b, &s.q, |b, x, y| b.q_q(x, y))
    }),
    pattern("C>1 Q=1", Many, Zero, One, |b, s| {
        each_c_pair(b, s, |b, x, y| b.c_c_q(x, y, s.q[0]))?;
        s.c.iter().try_for_each(|c| b.c_q(c, s.q[0]))
    }),
    pattern("T>1 Q=1", Zero, Many, One, |b, s| {
        s.t.iter().try_for_each(|t| b.t_q(t, s.q[0]))?;
        each_pair(b, &s.t, |b, x, y| b.t_t(x, y))
    }),
    pattern("C>1 T=1", Many, One, Zero, |b, s| {
        s.c.iter().try_for_each(|c| b.c_t(c, s.t[0]))?;
        each_c_pair(b, s, |b, x, y| b.c_c(x, y))
    }),
    pattern("T=1 Q>1", Zero, One, Many, |b, s| {
        b.t_multi_q(s.t[0], &s.q)?;
        s.q.iter().try_for_each(|q| b.t_q(s.t[0], q))
    }),
    pattern("C>1", Many, Zero, Zero, |b, s| each_c_pair(b, s, |b, x, y| b.c_c(x, y))),
    pattern("T>1", Zero, Many, Zero, |b, s| each_pair(b, &s.t, |b, x, y| b.t_t(x, y))),
    pattern("Q>1", Zero, Zero, Many, |b, s| each_pair(b, &s.q, |b, x, y| b.q_q(x, y))),
    pattern("C=1 T=1", One, One, Zero, |b, s| b.c_t(s.c[0], s.t[0])),
    pattern("C=1 Q=1", One, Zero, One, |b, s| b.c_q(s.c[0], s.q[0])),
    pattern("T=1 Q=1", Zero, One, One, |b, s| b.t_q(s.t[0], s.q[0])),
    pattern("C=1 T=1 Q=1", One, One, One, |b, s| {
        b.c_t_q(s.c[0], s.t[0], s.q[0])?;
        b.c_q(s.c[0], s.q[0])?;
        b.t_q(s.t[0], s.q[0])
    }),
];

fn each_pair<'s>(
    builder: &mut CaseBuilder<'_>,
    fields: &[&'s FieldSchema],
    mut f: impl FnMut(&mut CaseBuilder<'_>, &'s FieldSchema, &'s FieldSchema) -> Result<()>,
) -> Result<()> {
    for (i, x) in fields.iter().enumerate() {
        for y in &fields[i + 1..] {
            f(builder, x, y)?;
        }
    }
    Ok(())
}

fn each_c_pair<'s>(
    builder: &mut CaseBuilder<'_>,
    selection: &Buckets<'s>,
    f: impl FnMut(&mut CaseBuilder<'_>, &'s FieldSchema, &'s FieldSchema) -> Result<()>,
) -> Result<()> {
    each_pair(builder, &selection.c, f)
}

/// Name of the pattern the selection matches, if any
#[cfg(test)]
fn matching_pattern(selection: &Buckets<'_>) -> Option<&'static str> {
    find(selection).map(|p| p.name)
}

fn find(selection: &Buckets<'_>) -> Option<&'static Pattern> {
    let (c, t, q) = selection.counts();
    PATTERNS
        .iter()
        .find(|p| p.c.matches(c) && p.t.matches(t) && p.q.matches(q))
}

/// Build exact-arity candidates, falling back to single-field cases
pub(crate) fn build(builder: &mut CaseBuilder<'_>, selection: &Buckets<'_>) -> Result<()> {
    match find(selection) {
        Some(pattern) => {
            debug!("Exact selection {:?} matched {}", selection.counts(), pattern.name);
            (pattern.build)(builder, selection)
        }
        None => {
            debug!("Exact selection {:?} matched no pattern", selection.counts());
            selection.iter().try_for_each(|f| builder.single(f))
        }
    }
}
