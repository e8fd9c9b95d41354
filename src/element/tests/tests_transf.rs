#[cfg(test)]
mod tests {
    use crate::element::{
        Element, ElementWithOne, GreensPoints, InverseElement, PPERM_UNDEFINED, PPerm16, Transf,
        Transf16,
    };

    #[test]
    fn test_compose_reads_left_to_right() {
        let a = Transf::new(vec![1, 2, 0]);
        let b = Transf::new(vec![0, 0, 2]);
        // (a then b)(0) = b(a(0)) = b(1) = 0.
        let ab = a.compose(&b);
        assert_eq!(ab.images(), &[0, 2, 0]);
        let ba = b.compose(&a);
        assert_eq!(ba.images(), &[1, 1, 0]);
    }

    #[test]
    fn test_compose_associative() {
        let a = Transf::new(vec![1, 3, 4, 2, 3]);
        let b = Transf::new(vec![3, 2, 1, 3, 3]);
        let c = Transf::new(vec![0, 0, 0, 0, 1]);
        assert_eq!(
            a.compose(&b).compose(&c),
            a.compose(&b.compose(&c))
        );
    }

    #[test]
    fn test_one_is_identity() {
        let a = Transf::new(vec![1, 3, 4, 2, 3]);
        let e = a.one();
        assert_eq!(a.compose(&e), a);
        assert_eq!(e.compose(&a), a);
        assert_eq!(e, Transf::one_of_degree(5));
    }

    #[test]
    fn test_greens_points_of_transf() {
        let a = Transf::new(vec![1, 0, 1, 1]);
        assert_eq!(a.lambda(), vec![0, 1]);
        assert_eq!(a.rank(), 2);
        // Kernel classes {0, 2, 3} and {1} in first-occurrence order.
        assert_eq!(a.rho(), vec![0, 1, 0, 0]);

        // lambda(x · a) from lambda(x).
        let x = Transf::new(vec![2, 2, 3, 3]);
        assert_eq!(a.lambda_act(&x.lambda()), x.compose(&a).lambda());
        // rho(a · x) from rho(x).
        assert_eq!(a.rho_act(&x.rho()), a.compose(&x).rho());
    }

    #[test]
    fn test_packed_transf_matches_generic() {
        let images = [1u8, 3, 4, 2, 3, 0, 6, 6];
        let generic = Transf::new(images.to_vec());
        let packed = Transf16::new(&images);
        assert_eq!(packed.degree(), 8);
        for i in 0..8 {
            assert_eq!(packed.apply(i), generic.apply(i));
        }

        let other = [0u8, 0, 5, 5, 2, 7, 1, 4];
        let generic_prod = generic.compose(&Transf::new(other.to_vec()));
        let packed_prod = packed.compose(&Transf16::new(&other));
        for i in 0..8 {
            assert_eq!(packed_prod.apply(i), generic_prod.apply(i));
        }
        assert_eq!(
            Transf16::one_of_degree(8).compose(&packed),
            packed
        );
    }

    #[test]
    fn test_pperm_compose_and_inverse() {
        // 0 -> 2, 1 undefined, 2 -> 1.
        let p = PPerm16::new(&[2, PPERM_UNDEFINED, 1]);
        assert_eq!(p.defined_points(), 2);

        let q = p.inverse();
        assert_eq!(q.apply(2), 0);
        assert_eq!(q.apply(1), 2);
        assert_eq!(q.apply(0), PPERM_UNDEFINED);

        // p · p⁻¹ is the identity restricted to the domain of p.
        let e = p.compose(&q);
        assert_eq!(e.apply(0), 0);
        assert_eq!(e.apply(1), PPERM_UNDEFINED);
        assert_eq!(e.apply(2), 2);

        let one = PPerm16::one_of_degree(3);
        assert_eq!(p.compose(&one), p);
        assert_eq!(one.compose(&p), p);
    }
}
