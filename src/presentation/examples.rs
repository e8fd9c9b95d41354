//! Presentations of well-known semigroup and monoid families.
//!
//! Two flavours live here:
//!
//! - hand-written presentations from the literature (symmetric group via
//!   its Coxeter generators, Temperley–Lieb, plactic, chinese, stylic,
//!   monogenic, Fibonacci);
//! - presentations *derived from a concrete model*: the transformation
//!   families (full transformation, symmetric inverse, partition
//!   monoids) are enumerated from their standard generating sets with
//!   Froidure–Pin, whose rule set is a defining presentation. These are
//!   exact by construction for every degree accepted, at the price of
//!   enumerating the monoid once.
//!
//! Degree arguments are validated eagerly; a degree at which a family's
//! presentation is not available raises
//! [`PresentationError::InvalidArgument`].

use super::{Presentation, PresentationError};
use crate::congruence::bridge;
use crate::element::{Bipartition, PPERM_UNDEFINED, PPerm16, Transf};
use crate::froidure_pin::FroidurePin;
use crate::word::Letter;

/// The symmetric group of degree `n` on its `n - 1` Coxeter generators.
pub fn symmetric_group(n: usize) -> Result<Presentation, PresentationError> {
    if !(1..=256).contains(&n) {
        return Err(PresentationError::InvalidArgument(
            "symmetric_group requires 1 <= degree <= 256".to_string(),
        ));
    }
    let mut p = Presentation::new(n - 1);
    p.set_contains_empty_word(true);
    for i in 0..n.saturating_sub(1) as u8 {
        p.add_rule(&[i, i], &[])?;
        if usize::from(i) + 1 < n - 1 {
            p.add_rule(&[i, i + 1, i, i + 1, i, i + 1], &[])?;
        }
        for j in i + 2..(n - 1) as Letter {
            p.add_rule(&[i, j, i, j], &[])?;
        }
    }
    Ok(p)
}

/// The full transformation monoid of degree `n`, presented by the rules
/// of its enumeration from the cycle, a transposition, and a rank-`n-1`
/// idempotent.
pub fn full_transformation_monoid(n: usize) -> Result<Presentation, PresentationError> {
    if !(2..=255).contains(&n) {
        return Err(PresentationError::InvalidArgument(
            "full_transformation_monoid requires 2 <= degree <= 255".to_string(),
        ));
    }
    let transposition = Transf::new(swap_images(n));
    let cycle = Transf::new(cycle_images(n));
    let collapse = {
        let mut images: Vec<u8> = (0..n as u8).collect();
        images[1] = 0;
        Transf::new(images)
    };
    let mut fp = FroidurePin::new(vec![transposition, cycle, collapse])
        .expect("generators share a degree");
    Ok(bridge::to_presentation(&mut fp))
}

/// The symmetric inverse monoid of degree `n`, presented by the rules of
/// its enumeration from the cycle, a transposition, and the partial
/// identity on all but one point.
pub fn symmetric_inverse_monoid(n: usize) -> Result<Presentation, PresentationError> {
    if !(2..=16).contains(&n) {
        return Err(PresentationError::InvalidArgument(
            "symmetric_inverse_monoid requires 2 <= degree <= 16".to_string(),
        ));
    }
    let transposition = PPerm16::new(&swap_images(n));
    let cycle = PPerm16::new(&cycle_images(n));
    let restriction = {
        let mut images: Vec<u8> = (0..n as u8).collect();
        images[n - 1] = PPERM_UNDEFINED;
        PPerm16::new(&images)
    };
    let mut fp = FroidurePin::new(vec![transposition, cycle, restriction])
        .expect("generators share a degree");
    Ok(bridge::to_presentation(&mut fp))
}

/// The partition monoid of degree `n`, presented by the rules of its
/// enumeration from a transposition, the rotation, a projection, and a
/// join.
pub fn partition_monoid(n: usize) -> Result<Presentation, PresentationError> {
    if !(2..=85).contains(&n) {
        return Err(PresentationError::InvalidArgument(
            "partition_monoid requires 2 <= degree <= 85".to_string(),
        ));
    }
    let mut fp = FroidurePin::new(vec![
        Bipartition::transposition(n, 0),
        Bipartition::rotation(n),
        Bipartition::projection(n),
        Bipartition::join(n),
    ])
    .expect("generators share a degree");
    Ok(bridge::to_presentation(&mut fp))
}

/// The Temperley–Lieb (Jones) monoid on `n - 1` diagram generators; its
/// size is the `n`-th Catalan number.
pub fn temperley_lieb_monoid(n: usize) -> Result<Presentation, PresentationError> {
    if !(3..=256).contains(&n) {
        return Err(PresentationError::InvalidArgument(
            "temperley_lieb_monoid requires 3 <= degree <= 256".to_string(),
        ));
    }
    let k = (n - 1) as Letter;
    let mut p = Presentation::new(n - 1);
    p.set_contains_empty_word(true);
    for i in 0..k {
        p.add_rule(&[i, i], &[i])?;
        for j in i + 2..k {
            p.add_rule(&[i, j], &[j, i])?;
        }
    }
    for i in 0..k {
        if i + 1 < k {
            p.add_rule(&[i, i + 1, i], &[i])?;
            p.add_rule(&[i + 1, i, i + 1], &[i + 1])?;
        }
    }
    Ok(p)
}

/// The plactic monoid of rank `n` (Knuth relations). Infinite for
/// `n >= 1`.
pub fn plactic_monoid(n: usize) -> Result<Presentation, PresentationError> {
    if n > 255 {
        return Err(PresentationError::InvalidArgument(
            "plactic_monoid requires rank at most 255".to_string(),
        ));
    }
    let mut p = Presentation::new(n);
    p.set_contains_empty_word(true);
    let k = n as Letter;
    for x in 0..k {
        for y in x..k {
            for z in y..k {
                if x <= y && y < z {
                    // xzy = zxy
                    p.add_rule(&[x, z, y], &[z, x, y])?;
                }
                if x < y && y <= z {
                    // yxz = yzx
                    p.add_rule(&[y, x, z], &[y, z, x])?;
                }
            }
        }
    }
    Ok(p)
}

/// The stylic monoid of rank `n`: the plactic monoid with every letter
/// idempotent. Finite, of size Bell(`n + 1`).
pub fn stylic_monoid(n: usize) -> Result<Presentation, PresentationError> {
    let mut p = plactic_monoid(n)?;
    for a in 0..n as Letter {
        p.add_rule(&[a, a], &[a])?;
    }
    Ok(p)
}

/// The chinese monoid of rank `n`. Infinite for `n >= 2`.
pub fn chinese_monoid(n: usize) -> Result<Presentation, PresentationError> {
    if n > 255 {
        return Err(PresentationError::InvalidArgument(
            "chinese_monoid requires rank at most 255".to_string(),
        ));
    }
    let mut p = Presentation::new(n);
    p.set_contains_empty_word(true);
    let k = n as Letter;
    for a in 0..k {
        for b in a..k {
            for c in b..k {
                if a < b && b < c {
                    p.add_rule(&[c, b, a], &[c, a, b])?;
                    p.add_rule(&[c, b, a], &[b, c, a])?;
                }
                if a < b && b == c {
                    p.add_rule(&[b, b, a], &[b, a, b])?;
                }
                if a == b && b < c {
                    p.add_rule(&[c, a, a], &[a, c, a])?;
                }
            }
        }
    }
    Ok(p)
}

/// The monogenic semigroup with index `m` and period `r`:
/// `a^(m + r) = a^m`, of size `m + r - 1`.
pub fn monogenic_semigroup(m: usize, r: usize) -> Result<Presentation, PresentationError> {
    if m == 0 || r == 0 {
        return Err(PresentationError::InvalidArgument(
            "monogenic_semigroup requires positive index and period".to_string(),
        ));
    }
    let mut p = Presentation::new(1);
    p.add_rule(&vec![0; m + r], &vec![0; m])?;
    Ok(p)
}

/// The Fibonacci semigroup `F(r, n)`: each product of `r` consecutive
/// generators equals the next generator, indices mod `n`.
pub fn fibonacci_semigroup(r: usize, n: usize) -> Result<Presentation, PresentationError> {
    if r < 2 || n == 0 || n > 255 {
        return Err(PresentationError::InvalidArgument(
            "fibonacci_semigroup requires r >= 2 and 1 <= n <= 255".to_string(),
        ));
    }
    let mut p = Presentation::new(n);
    for i in 0..n {
        let lhs: Vec<Letter> = (0..r).map(|j| ((i + j) % n) as Letter).collect();
        p.add_rule(&lhs, &[((i + r) % n) as Letter])?;
    }
    Ok(p)
}

fn swap_images(n: usize) -> Vec<u8> {
    let mut images: Vec<u8> = (0..n as u8).collect();
    images.swap(0, 1);
    images
}

fn cycle_images(n: usize) -> Vec<u8> {
    (0..n).map(|i| ((i + 1) % n) as u8).collect()
}
