//! Integration tests for the public `fpsemi` API.
//!
//! These tests exercise the engines end to end through the public
//! surface only: presentations in, class counts / normal forms /
//! Green's data out. No internal modules are referenced.
//!
//! ## Coverage areas
//! - **Todd-Coxeter**: two-sided and one-sided enumeration, word
//!   queries, standardisation
//! - **Knuth-Bendix**: completion, confluence, normal forms
//! - **Froidure-Pin**: enumeration of concrete semigroups, Cayley data
//! - **Konieczny**: D/L/R/H classification sanity laws
//! - **Bridges**: engine-to-engine conversions agree on class counts
//! - **Facade**: congruence queries dispatched to the winning engine
//!
//! Large scenarios (multi-million-element monoids, pathological
//! collapses) are `#[ignore]`d; run them explicitly with
//! `cargo test --release -- --ignored`.

use fpsemi::CongruenceKind;
use fpsemi::congruence::{Congruence, bridge};
use fpsemi::element::{BMat8, Transf};
use fpsemi::froidure_pin::FroidurePin;
use fpsemi::knuth_bendix::KnuthBendix;
use fpsemi::konieczny::Konieczny;
use fpsemi::presentation::{self, Presentation, examples, from_symbols};
use fpsemi::runner::{Cardinality, ReportGuard, Tril};
use fpsemi::todd_coxeter::{
    LookaheadExtent, LookaheadStyle, Strategy, ToddCoxeter, ToddCoxeterConfig,
};

// ------------------------------------------------------------------------------------------------
// Helpers
// ------------------------------------------------------------------------------------------------

/// <a, b | aaa = a, bbbb = b, ababab = aa>: 27 classes.
fn presentation_27() -> Presentation {
    from_symbols("ab", &[("aaa", "a"), ("bbbb", "b"), ("ababab", "aa")], false).unwrap()
}

/// <0, 1 | 000 = 0, 0 = 11>: 5 classes.
fn presentation_5() -> Presentation {
    let mut p = Presentation::new(2);
    p.add_rule(&[0, 0, 0], &[0]).unwrap();
    p.add_rule(&[0], &[1, 1]).unwrap();
    p
}

fn bmat5(rows: [[u8; 5]; 5]) -> BMat8 {
    let mut padded = [[0u8; 8]; 8];
    for (i, row) in rows.iter().enumerate() {
        padded[i][..5].copy_from_slice(row);
    }
    BMat8::from_rows(&padded[..5])
}

// ------------------------------------------------------------------------------------------------
// Todd-Coxeter scenarios
// ------------------------------------------------------------------------------------------------

#[test]
fn test_todd_coxeter_small_two_sided() {
    let _rg = ReportGuard::new(false);
    let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, presentation_27()).unwrap();
    assert_eq!(tc.number_of_classes(), Cardinality::Finite(27));
}

#[test]
fn test_todd_coxeter_normal_forms_shortlex() {
    let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, presentation_5()).unwrap();
    assert_eq!(tc.number_of_classes(), Cardinality::Finite(5));
    assert_eq!(
        tc.normal_forms().unwrap(),
        vec![vec![0], vec![1], vec![0, 0], vec![0, 1], vec![0, 0, 1]]
    );
}

#[test]
fn test_finite_case_count_law() {
    // Exactly n distinct normal forms for n classes, in every engine.
    let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, presentation_27()).unwrap();
    let n = tc.number_of_classes().as_finite().unwrap();
    let forms = tc.normal_forms().unwrap();
    assert_eq!(forms.len() as u64, n);

    let mut kb = KnuthBendix::new(CongruenceKind::TwoSided, presentation_27()).unwrap();
    let m = kb.number_of_classes().unwrap().as_finite().unwrap();
    assert_eq!(m, n);
    assert_eq!(kb.normal_forms().count() as u64, n);
}

// ------------------------------------------------------------------------------------------------
// Equivalence laws
// ------------------------------------------------------------------------------------------------

#[test]
fn test_reflexivity_and_substitutivity() {
    let mut c = Congruence::new(CongruenceKind::TwoSided, presentation_5()).unwrap();
    let words: [&[u8]; 4] = [&[0], &[1], &[0, 1], &[1, 1, 0]];
    for u in words {
        assert!(c.contains(u, u).unwrap());
    }
    // 0 = 11 implies u·0·v = u·11·v.
    for w in words {
        let mut uw: Vec<u8> = vec![0];
        uw.extend_from_slice(w);
        let mut vw: Vec<u8> = vec![1, 1];
        vw.extend_from_slice(w);
        assert!(c.contains(&uw, &vw).unwrap());

        let mut wu = w.to_vec();
        wu.push(0);
        let mut wv = w.to_vec();
        wv.extend_from_slice(&[1, 1]);
        assert!(c.contains(&wu, &wv).unwrap());
    }
}

#[test]
fn test_normal_form_uniqueness() {
    let mut c = Congruence::new(CongruenceKind::TwoSided, presentation_5()).unwrap();
    for word in [
        vec![0u8],
        vec![0, 0, 0, 0, 0],
        vec![1, 1, 1, 1],
        vec![0, 1, 1, 0],
    ] {
        let reduced = c.reduce(&word).unwrap();
        assert_eq!(c.reduce(&reduced).unwrap(), reduced);
        assert!(c.contains(&word, &reduced).unwrap());
    }
    let u = c.reduce(&[0, 0, 0]).unwrap();
    let v = c.reduce(&[1, 1]).unwrap();
    assert_eq!(u, v);
}

// ------------------------------------------------------------------------------------------------
// Froidure-Pin and agreement between engines
// ------------------------------------------------------------------------------------------------

#[test]
fn test_froidure_pin_todd_coxeter_agreement() {
    let mut fp = FroidurePin::new(vec![
        Transf::new(vec![1, 3, 4, 2, 3]),
        Transf::new(vec![3, 2, 1, 3, 3]),
    ])
    .unwrap();
    assert_eq!(fp.size(), 88);
    assert_eq!(fp.number_of_rules(), 18);

    let mut tc = bridge::to_todd_coxeter(CongruenceKind::TwoSided, &mut fp).unwrap();
    assert_eq!(tc.number_of_classes(), Cardinality::Finite(88));

    let mut kb = bridge::to_knuth_bendix(CongruenceKind::TwoSided, &mut fp).unwrap();
    assert_eq!(kb.number_of_classes().unwrap(), Cardinality::Finite(88));
}

#[test]
fn test_knuth_bendix_confluence_property() {
    let mut kb = KnuthBendix::new(CongruenceKind::TwoSided, presentation_5()).unwrap();
    kb.run().unwrap();
    assert!(kb.confluent_known());
    // Every critical overlap of the stored rules resolves.
    assert!(kb.confluent());
}

#[test]
fn test_facade_tri_valued_queries() {
    let mut c = Congruence::new(CongruenceKind::TwoSided, presentation_27()).unwrap();
    assert_eq!(c.currently_contains(&[0], &[1]).unwrap(), Tril::Unknown);
    c.run().unwrap();
    assert_eq!(c.currently_contains(&[0], &[1]).unwrap(), Tril::False);
    assert_eq!(
        c.currently_contains(&[0, 0, 0], &[0]).unwrap(),
        Tril::True
    );
}

// ------------------------------------------------------------------------------------------------
// Konieczny sanity laws
// ------------------------------------------------------------------------------------------------

#[test]
fn test_konieczny_sanity() {
    let mut k = Konieczny::new(vec![
        Transf::new(vec![1, 0, 2]),
        Transf::new(vec![1, 2, 0]),
        Transf::new(vec![0, 0, 2]),
    ])
    .unwrap();
    let size = k.size();
    k.run();

    let classes: Vec<_> = k.d_classes().cloned().collect();
    let total: usize = classes.iter().map(|d| d.size()).sum();
    assert_eq!(total, size, "D-classes cover the monoid");

    for class in &classes {
        if class.is_regular() {
            for x in k.d_class_elements(class) {
                use fpsemi::element::GreensPoints;
                assert_eq!(x.rank(), class.rank());
            }
        }
        assert_eq!(
            class.is_square(),
            class.number_of_l_classes() == class.number_of_r_classes()
        );
    }
}

// ------------------------------------------------------------------------------------------------
// Heavy scenarios (run with --ignored, in release mode)
// ------------------------------------------------------------------------------------------------

#[test]
#[ignore = "enumerates the full transformation monoid of degree 5"]
fn test_full_transformation_monoid_5() {
    let _rg = ReportGuard::new(true);
    let p = examples::full_transformation_monoid(5).unwrap();
    let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, p.clone()).unwrap();
    assert_eq!(tc.number_of_classes(), Cardinality::Finite(3125));

    let mut kb = KnuthBendix::new(CongruenceKind::TwoSided, p).unwrap();
    assert_eq!(kb.number_of_classes().unwrap(), Cardinality::Finite(3125));
}

#[test]
#[ignore = "enumerates the symmetric inverse monoid of degree 4"]
fn test_symmetric_inverse_monoid_4() {
    let p = examples::symmetric_inverse_monoid(4).unwrap();
    let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, p).unwrap();
    assert_eq!(tc.number_of_classes(), Cardinality::Finite(209));
}

#[test]
#[ignore = "enumerates the partition monoid of degree 4"]
fn test_partition_monoid_4() {
    let p = examples::partition_monoid(4).unwrap();
    let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, p).unwrap();
    assert_eq!(tc.number_of_classes(), Cardinality::Finite(4140));
}

#[test]
#[ignore = "23 million boolean matrices"]
fn test_hall_monoid_5() {
    let _rg = ReportGuard::new(true);
    let mut k = Konieczny::new(vec![
        bmat5([[0, 1, 0, 0, 0], [0, 0, 1, 0, 0], [0, 0, 0, 1, 0], [0, 0, 0, 0, 1], [1, 0, 0, 0, 0]]),
        bmat5([[0, 1, 0, 0, 0], [1, 0, 0, 0, 0], [0, 0, 1, 0, 0], [0, 0, 0, 1, 0], [0, 0, 0, 0, 1]]),
        bmat5([[0, 0, 0, 0, 1], [0, 0, 0, 1, 0], [0, 0, 1, 0, 0], [0, 1, 0, 0, 0], [1, 0, 0, 0, 1]]),
        bmat5([[0, 0, 0, 0, 1], [0, 0, 0, 1, 0], [0, 1, 1, 0, 0], [1, 0, 1, 0, 0], [1, 1, 0, 0, 0]]),
        bmat5([[0, 0, 0, 0, 1], [0, 0, 1, 1, 0], [0, 1, 0, 1, 0], [1, 0, 0, 1, 0], [1, 1, 1, 0, 0]]),
        bmat5([[0, 0, 0, 0, 1], [0, 0, 1, 1, 0], [0, 1, 0, 1, 0], [1, 0, 1, 0, 0], [1, 1, 0, 0, 0]]),
        bmat5([[0, 0, 0, 1, 1], [0, 0, 1, 0, 1], [0, 1, 0, 0, 1], [1, 0, 0, 0, 1], [1, 1, 1, 1, 0]]),
        bmat5([[0, 0, 0, 1, 1], [0, 0, 1, 0, 1], [0, 1, 0, 0, 1], [1, 0, 0, 1, 0], [1, 1, 1, 0, 0]]),
        bmat5([[0, 0, 0, 1, 1], [0, 0, 1, 0, 1], [0, 1, 0, 1, 0], [1, 0, 1, 0, 0], [1, 1, 0, 0, 1]]),
        bmat5([[0, 0, 0, 1, 1], [0, 0, 1, 0, 1], [0, 1, 0, 1, 0], [1, 0, 1, 1, 0], [1, 1, 0, 0, 1]]),
        bmat5([[0, 0, 0, 1, 1], [0, 0, 1, 0, 1], [0, 1, 1, 1, 0], [1, 0, 1, 1, 0], [1, 1, 0, 0, 1]]),
        bmat5([[0, 0, 0, 1, 1], [0, 0, 1, 0, 1], [0, 1, 0, 1, 0], [1, 0, 1, 0, 0], [1, 1, 0, 0, 0]]),
    ])
    .unwrap();
    assert_eq!(k.size(), 23_191_071);
}

#[test]
#[ignore = "32 million boolean matrices"]
fn test_regular_bmat_monoid_5() {
    let _rg = ReportGuard::new(true);
    let mut k = Konieczny::new(vec![
        bmat5([[0, 1, 0, 0, 0], [1, 0, 0, 0, 0], [0, 0, 1, 0, 0], [0, 0, 0, 1, 0], [0, 0, 0, 0, 1]]),
        bmat5([[0, 1, 0, 0, 0], [0, 0, 1, 0, 0], [0, 0, 0, 1, 0], [0, 0, 0, 0, 1], [1, 0, 0, 0, 0]]),
        bmat5([[1, 0, 0, 0, 0], [1, 1, 0, 0, 0], [0, 0, 1, 0, 0], [0, 0, 0, 1, 0], [0, 0, 0, 0, 1]]),
        bmat5([[0, 0, 0, 0, 0], [0, 1, 0, 0, 0], [0, 0, 1, 0, 0], [0, 0, 0, 1, 0], [0, 0, 0, 0, 1]]),
    ])
    .unwrap();
    assert_eq!(k.size(), 32_311_832);
    assert_eq!(k.number_of_idempotents(), 73_023);
}

#[test]
#[ignore = "pathological coincidence cascade"]
fn test_degenerate_collapse() {
    let _rg = ReportGuard::new(true);
    let mut p = from_symbols(
        "abcdef",
        &[
            ("bbdeaecbffdbaeeccefbccefb", ""),
            ("ccefbfacddecbffaafdcaafdc", ""),
            ("aafdcdbaeefacddbbdeabbdea", ""),
        ],
        true,
    )
    .unwrap();
    presentation::add_inverse_rules(&mut p, &[3, 4, 5, 0, 1, 2]).unwrap();

    let mut tc = ToddCoxeter::with_config(
        CongruenceKind::TwoSided,
        p,
        ToddCoxeterConfig {
            lookahead_style: LookaheadStyle::Hlt,
            lookahead_extent: LookaheadExtent::Full,
            strategy: Strategy::Hlt,
            large_collapse: usize::MAX,
            ..ToddCoxeterConfig::default()
        },
    )
    .unwrap();
    assert_eq!(tc.number_of_classes(), Cardinality::Finite(1));
}
