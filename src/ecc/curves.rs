//! Named curve parameter sets.
//!
//! Hex parameter strings for the supported prime, binary, Montgomery
//! and Edwards curves, plus a builder that assembles a ready
//! [`EccConfig`] for a chosen reduction strategy. Binary curves carry
//! their field polynomial in the `p` slot and always reduce naively
//! against it; Montgomery curves get `(A + 2)/4` precomputed into the
//! ladder constant.

use super::EccConfig;
use super::Field;
use crate::bigint::Mpz;
use crate::modular::{ModConfig, Reduction, SolinasSecp192r1};
use crate::word::Limb;

/// One named curve's textual parameters.
pub struct CurveParams {
    pub name: &'static str,
    pub field: Field,
    pub num_bits: usize,
    pub num_bytes: usize,
    /// Field prime, or the field polynomial for binary curves.
    pub p: &'static str,
    /// Group order.
    pub order_m: &'static str,
    /// Curve coefficient a (hex, optionally signed).
    pub a: &'static str,
    /// Curve coefficient b, or d for Edwards curves.
    pub b_or_d: &'static str,
    pub g_x: &'static str,
    pub g_y: &'static str,
    /// Optional dual base for Shamir's-trick fixtures.
    pub g_x_dual: &'static str,
    pub g_y_dual: &'static str,
}

/// The supported parameter sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamedCurve {
    Secp192r1,
    Secp224r1,
    Secp256r1,
    Secp384r1,
    Secp521r1,
    Sect163r2,
    Sect233r1,
    Sect283r1,
    Sect409r1,
    Sect571r1,
    Sect163k1,
    Sect233k1,
    Sect283k1,
    Sect409k1,
    Sect571k1,
    Curve25519,
    Curve448,
    Edwards25519,
    Edwards448,
}

impl NamedCurve {
    /// The textual parameters of this curve.
    pub fn params(&self) -> &'static CurveParams {
        match self {
            NamedCurve::Secp192r1 => &SECP192R1,
            NamedCurve::Secp224r1 => &SECP224R1,
            NamedCurve::Secp256r1 => &SECP256R1,
            NamedCurve::Secp384r1 => &SECP384R1,
            NamedCurve::Secp521r1 => &SECP521R1,
            NamedCurve::Sect163r2 => &SECT163R2,
            NamedCurve::Sect233r1 => &SECT233R1,
            NamedCurve::Sect283r1 => &SECT283R1,
            NamedCurve::Sect409r1 => &SECT409R1,
            NamedCurve::Sect571r1 => &SECT571R1,
            NamedCurve::Sect163k1 => &SECT163K1,
            NamedCurve::Sect233k1 => &SECT233K1,
            NamedCurve::Sect283k1 => &SECT283K1,
            NamedCurve::Sect409k1 => &SECT409K1,
            NamedCurve::Sect571k1 => &SECT571K1,
            NamedCurve::Curve25519 => &CURVE25519,
            NamedCurve::Curve448 => &CURVE448,
            NamedCurve::Edwards25519 => &EDWARDS25519,
            NamedCurve::Edwards448 => &EDWARDS448,
        }
    }

    /// Builds a ready configuration for this curve under the requested
    /// reduction strategy. Binary curves always reduce against their
    /// field polynomial; the Solinas strategy is honoured where a
    /// reducer exists and falls back to Barrett otherwise.
    pub fn make_config<W: Limb>(&self, reduction: Reduction) -> EccConfig<W> {
        let p = self.params();

        let modulus = Mpz::from_str_radix(p.p, 16).expect("curve modulus");
        let order = Mpz::from_str_radix(p.order_m, 16).expect("curve order");
        let a = Mpz::from_str_radix(p.a, 16).expect("curve a");
        let b_or_d = Mpz::from_str_radix(p.b_or_d, 16).expect("curve b/d");

        let effective = match (p.field, reduction) {
            (Field::WeierstrassBinary, _) => Reduction::Naive,
            (_, Reduction::Solinas) if *self != NamedCurve::Secp192r1 => Reduction::Barrett,
            (_, r) => r,
        };

        let mut mcfg = ModConfig::new(modulus, p.num_bits, effective);
        if effective == Reduction::Solinas {
            mcfg = mcfg.with_solinas(Box::new(SolinasSecp192r1));
        }

        let zero = Mpz::new();
        let (ca, cb, cd) = match p.field {
            Field::WeierstrassPrime | Field::WeierstrassBinary => (&a, &b_or_d, &zero),
            Field::MontgomeryPrime => {
                // Ladder constant (A + 2)/4
                let a24 = (&(&a + &Mpz::from_u32(2))).shr_bits(2);
                return EccConfig::new(mcfg, order, &a, &b_or_d, &a24);
            }
            Field::EdwardsPrime => (&a, &b_or_d, &b_or_d),
        };

        EccConfig::new(mcfg, order, ca, cb, cd)
    }

    /// The base point in plain affine coordinates.
    pub fn base_point<W: Limb>(&self) -> (Mpz<W>, Mpz<W>) {
        let p = self.params();
        (
            Mpz::from_str_radix(p.g_x, 16).expect("base x"),
            Mpz::from_str_radix(p.g_y, 16).expect("base y"),
        )
    }
}

static SECP192R1: CurveParams = CurveParams {
    name: "secp192r1",
    field: Field::WeierstrassPrime,
    num_bits: 192,
    num_bytes: 24,
    p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFFFFFFFFFF",
    order_m: "FFFFFFFFFFFFFFFFFFFFFFFF99DEF836146BC9B1B4D22831",
    a: "-3",
    b_or_d: "64210519E59C80E70FA7E9AB72243049FEB8DEECC146B9B1",
    g_x: "188DA80EB03090F67CBF20EB43A18800F4FF0AFD82FF1012",
    g_y: "07192B95FFC8DA78631011ED6B24CDD573F977A11E794811",
    g_x_dual: "5872D24048BAFB98C050736E2D83D69A6A72C5FC9E66CB3B",
    g_y_dual: "38CE388F78EDAB2CC215B177263B1F02A0A99D48863C7612",
};

static SECP224R1: CurveParams = CurveParams {
    name: "secp224r1",
    field: Field::WeierstrassPrime,
    num_bits: 224,
    num_bytes: 28,
    p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF000000000000000000000001",
    order_m: "FFFFFFFFFFFFFFFFFFFFFFFFFFFF16A2E0B8F03E13DD29455C5C2A3D",
    a: "-3",
    b_or_d: "B4050A850C04B3ABF54132565044B0B7D7BFD8BA270B39432355FFB4",
    g_x: "B70E0CBD6BB4BF7F321390B94A03C1D356C21122343280D6115C1D21",
    g_y: "BD376388B5F723FB4C22DFE6CD4375A05A07476444D5819985007E34",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECP256R1: CurveParams = CurveParams {
    name: "secp256r1",
    field: Field::WeierstrassPrime,
    num_bits: 256,
    num_bytes: 32,
    p: "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
    order_m: "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
    a: "-3",
    b_or_d: "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
    g_x: "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296",
    g_y: "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECP384R1: CurveParams = CurveParams {
    name: "secp384r1",
    field: Field::WeierstrassPrime,
    num_bits: 384,
    num_bytes: 48,
    p: "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff0000000000000000ffffffff",
    order_m: "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf581a0db248b0a77aecec196accc52973",
    a: "-3",
    b_or_d: "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875ac656398d8a2ed19d2a85c8edd3ec2aef",
    g_x: "aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b9859f741e082542a385502f25dbf55296c3a545e3872760ab7",
    g_y: "3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147ce9da3113b5f0b8c00a60b1ce1d7e819d7a431d7c90ea0e5f",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECP521R1: CurveParams = CurveParams {
    name: "secp521r1",
    field: Field::WeierstrassPrime,
    num_bits: 521,
    num_bytes: 66,
    p: "1ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
    order_m: "1fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffa51868783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e91386409",
    a: "-3",
    b_or_d: "51953eb9618e1c9a1f929a21a0b68540eea2da725b99b315f3b8b489918ef109e156193951ec7e937b1652c0bd3bb1bf073573df883d2c34f1ef451fd46b503f00",
    g_x: "c6858e06b70404e9cd9e3ecb662395b4429c648139053fb521f828af606b4d3dbaa14b5e77efe75928fe1dc127a2ffa8de3348b3c1856a429bf97e7e31c2e5bd66",
    g_y: "11839296a789a3bc0045c8a5fb42c7d1bd998f54449579b446817afbd17273e662c97ee72995ef42640c550b9013fad0761353c7086a272c24088be94769fd16650",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT163R2: CurveParams = CurveParams {
    name: "sect163r2",
    field: Field::WeierstrassBinary,
    num_bits: 163,
    num_bytes: 21,
    p: "800000000000000000000000000000000000000c9",
    order_m: "40000000000000000000292fe77e70c12a4234c33",
    a: "1",
    b_or_d: "20a601907b8c953ca1481eb10512f78744a3205fd",
    g_x: "3f0eba16286a2d57ea0991168d4994637e8343e36",
    g_y: "d51fbc6c71a0094fa2cdd545b11c5c0c797324f1",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT233R1: CurveParams = CurveParams {
    name: "sect233r1",
    field: Field::WeierstrassBinary,
    num_bits: 233,
    num_bytes: 30,
    p: "20000000000000000000000000000000000000004000000000000000001",
    order_m: "1000000000000000000000000000013e974e72f8a6922031d2603cfe0d7",
    a: "1",
    b_or_d: "66647ede6c332c7f8c0923bb58213b333b20e9ce4281fe115f7d8f90ad",
    g_x: "fac9dfcbac8313bb2139f1bb755fef65bc391f8b36f8f8eb7371fd558b",
    g_y: "1006a08a41903350678e58528bebf8a0beff867a7ca36716f7e01f81052",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT283R1: CurveParams = CurveParams {
    name: "sect283r1",
    field: Field::WeierstrassBinary,
    num_bits: 283,
    num_bytes: 36,
    p: "800000000000000000000000000000000000000000000000000000000000000000010a1",
    order_m: "3ffffffffffffffffffffffffffffffffffef90399660fc938a90165b042a7cefadb307",
    a: "1",
    b_or_d: "27b680ac8b8596da5a4af8a19a0303fca97fd7645309fa2a581485af6263e313b79a2f5",
    g_x: "5f939258db7dd90e1934f8c70b0dfec2eed25b8557eac9c80e2e198f8cdbecd86b12053",
    g_y: "3676854fe24141cb98fe6d4b20d02b4516ff702350eddb0826779c813f0df45be8112f4",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT409R1: CurveParams = CurveParams {
    name: "sect409r1",
    field: Field::WeierstrassBinary,
    num_bits: 409,
    num_bytes: 52,
    p: "2000000000000000000000000000000000000000000000000000000000000000000000000000000008000000000000000000001",
    order_m: "10000000000000000000000000000000000000000000000000001e2aad6a612f33307be5fa47c3c9e052f838164cd37d9a21173",
    a: "1",
    b_or_d: "21a5c2c8ee9feb5c4b9a753b7b476b7fd6422ef1f3dd674761fa99d6ac27c8a9a197b272822f6cd57a55aa4f50ae317b13545f",
    g_x: "15d4860d088ddb3496b0c6064756260441cde4af1771d4db01ffe5b34e59703dc255a868a1180515603aeab60794e54bb7996a7",
    g_y: "61b1cfab6be5f32bbfa78324ed106a7636b9c5a7bd198d0158aa4f5488d08f38514f1fdf4b4f40d2181b3681c364ba0273c706",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT571R1: CurveParams = CurveParams {
    name: "sect571r1",
    field: Field::WeierstrassBinary,
    num_bits: 571,
    num_bytes: 72,
    p: "80000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000425",
    order_m: "3ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe661ce18ff55987308059b186823851ec7dd9ca1161de93d5174d66e8382e9bb2fe84e47",
    a: "1",
    b_or_d: "2f40e7e2221f295de297117b7f3d62f5c6a97ffcb8ceff1cd6ba8ce4a9a18ad84ffabbd8efa59332be7ad6756a66e294afd185a78ff12aa520e4de739baca0c7ffeff7f2955727a",
    g_x: "303001d34b856296c16c0d40d3cd7750a93d1d2955fa80aa5f40fc8db7b2abdbde53950f4c0d293cdd711a35b67fb1499ae60038614f1394abfa3b4c850d927e1e7769c8eec2d19",
    g_y: "37bf27342da639b6dccfffeb73d69d78c6c27a6009cbbca1980f8533921e8a684423e43bab08a576291af8f461bb2a8b3531d2f0485c19b16e2f1516e23dd3c1a4827af1b8ac15b",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT163K1: CurveParams = CurveParams {
    name: "sect163k1",
    field: Field::WeierstrassBinary,
    num_bits: 163,
    num_bytes: 21,
    p: "800000000000000000000000000000000000000c9",
    order_m: "4000000000000000000020108a2e0cc0d99f8a5ef",
    a: "1",
    b_or_d: "1",
    g_x: "2fe13c0537bbc11acaa07d793de4e6d5e5c94eee8",
    g_y: "289070fb05d38ff58321f2e800536d538ccdaa3d9",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT233K1: CurveParams = CurveParams {
    name: "sect233k1",
    field: Field::WeierstrassBinary,
    num_bits: 233,
    num_bytes: 30,
    p: "20000000000000000000000000000000000000004000000000000000001",
    order_m: "8000000000000000000000000000069d5bb915bcd46efb1ad5f173abdf",
    a: "0",
    b_or_d: "1",
    g_x: "17232ba853a7e731af129f22ff4149563a419c26bf50a4c9d6eefad6126",
    g_y: "1db537dece819b7f70f555a67c427a8cd9bf18aeb9b56e0c11056fae6a3",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT283K1: CurveParams = CurveParams {
    name: "sect283k1",
    field: Field::WeierstrassBinary,
    num_bits: 283,
    num_bytes: 36,
    p: "800000000000000000000000000000000000000000000000000000000000000000010a1",
    order_m: "1ffffffffffffffffffffffffffffffffffe9ae2ed07577265dff7f94451e061e163c61",
    a: "0",
    b_or_d: "1",
    g_x: "503213f78ca44883f1a3b8162f188e553cd265f23c1567a16876913b0c2ac2458492836",
    g_y: "1ccda380f1c9e318d90f95d07e5426fe87e45c0e8184698e45962364e34116177dd2259",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT409K1: CurveParams = CurveParams {
    name: "sect409k1",
    field: Field::WeierstrassBinary,
    num_bits: 409,
    num_bytes: 52,
    p: "2000000000000000000000000000000000000000000000000000000000000000000000000000000008000000000000000000001",
    order_m: "7ffffffffffffffffffffffffffffffffffffffffffffffffffe5f83b2d4ea20400ec4557d5ed3e3e7ca5b4b5c83b8e01e5fcf",
    a: "0",
    b_or_d: "1",
    g_x: "60f05f658f49c1ad3ab1890f7184210efd0987e307c84c27accfb8f9f67cc2c460189eb5aaaa62ee222eb1b35540cfe9023746",
    g_y: "1e369050b7c4e42acba1dacbf04299c3460782f918ea427e6325165e9ea10e3da5f6c42e9c55215aa9ca27a5863ec48d8e0286b",
    g_x_dual: "0",
    g_y_dual: "0",
};

static SECT571K1: CurveParams = CurveParams {
    name: "sect571k1",
    field: Field::WeierstrassBinary,
    num_bits: 571,
    num_bytes: 72,
    p: "80000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000425",
    order_m: "20000000000000000000000000000000000000000000000000000000000000000000000131850e1f19a63e4b391a8db917f4138b630d84be5d639381e91deb45cfe778f637c1001",
    a: "0",
    b_or_d: "1",
    g_x: "26eb7a859923fbc82189631f8103fe4ac9ca2970012d5d46024804801841ca44370958493b205e647da304db4ceb08cbbd1ba39494776fb988b47174dca88c7e2945283a01c8972",
    g_y: "349dc807f4fbf374f4aeade3bca95314dd58cec9f307a54ffc61efc006d8a2c9d4979c0ac44aea74fbebbb9f772aedcb620b01a7ba7af1b320430c8591984f601cd4c143ef1c7a3",
    g_x_dual: "0",
    g_y_dual: "0",
};

static CURVE25519: CurveParams = CurveParams {
    name: "curve25519",
    field: Field::MontgomeryPrime,
    num_bits: 255,
    num_bytes: 32,
    p: "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed",
    order_m: "1000000000000000000000000000000014def9dea2f79cd65812631a5cf5d3ed",
    a: "76D06",
    b_or_d: "1",
    g_x: "9",
    g_y: "20AE19A1B8A086B4E01EDD2C7748D14C923D4D7E6D7C61B229E9C5A27ECED3D9",
    g_x_dual: "0",
    g_y_dual: "0",
};

static CURVE448: CurveParams = CurveParams {
    name: "curve448",
    field: Field::MontgomeryPrime,
    num_bits: 448,
    num_bytes: 56,
    p: "fffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
    order_m: "3fffffffffffffffffffffffffffffffffffffffffffffffffffffff7cca23e9c44edb49aed63690216cc2728dc58f552378c292ab5844f3",
    a: "262a6",
    b_or_d: "1",
    g_x: "5",
    g_y: "7D235D1295F5B1F66C98AB6E58326FCECBAE5D34F55545D060F75DC28DF3F6EDB8027E2346430D211312C4B150677AF76FD7223D457B5B1A",
    g_x_dual: "0",
    g_y_dual: "0",
};

static EDWARDS25519: CurveParams = CurveParams {
    name: "edwards25519",
    field: Field::EdwardsPrime,
    num_bits: 255,
    num_bytes: 32,
    p: "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed",
    order_m: "1000000000000000000000000000000014def9dea2f79cd65812631a5cf5d3ed",
    a: "-1",
    b_or_d: "52036cee2b6ffe738cc740797779e89800700a4d4141d8ab75eb4dca135978a3",
    g_x: "216936d3cd6e53fec0a4e231fdd6dc5c692cc7609525a7b2c9562d608f25d51a",
    g_y: "6666666666666666666666666666666666666666666666666666666666666658",
    g_x_dual: "0",
    g_y_dual: "0",
};

static EDWARDS448: CurveParams = CurveParams {
    name: "edwards448",
    field: Field::EdwardsPrime,
    num_bits: 448,
    num_bytes: 56,
    p: "fffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
    order_m: "3fffffffffffffffffffffffffffffffffffffffffffffffffffffff7cca23e9c44edb49aed63690216cc2728dc58f552378c292ab5844f3",
    a: "1",
    b_or_d: "-98a9",
    g_x: "4F1970C66BED0DED221D15A622BF36DA9E146570470F1767EA6DE324A3D3A46412AE1AF72AB66511433B80E18B00938E2626A82BC70CC05E",
    g_y: "693F46716EB6BC248876203756C9C7624BEA73736CA3984087789C1E05A0C2D73AD3FF1CE67C39C4FDBD132C4ED7C8AD9808795BF230FA14",
    g_x_dual: "0",
    g_y_dual: "0",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_parse() {
        for curve in [
            NamedCurve::Secp192r1,
            NamedCurve::Secp521r1,
            NamedCurve::Sect163r2,
            NamedCurve::Sect571k1,
            NamedCurve::Curve25519,
            NamedCurve::Edwards448,
        ] {
            let cfg = curve.make_config::<u64>(Reduction::Barrett);
            assert_eq!(cfg.modulus.mod_bits, curve.params().num_bits);
            let (x, y) = curve.base_point::<u64>();
            assert!(!x.is_zero() || !y.is_zero());
        }
    }

    #[test]
    fn curve25519_ladder_constant() {
        let cfg = NamedCurve::Curve25519.make_config::<u64>(Reduction::Barrett);
        // (486662 + 2) / 4 = 121666
        assert_eq!(cfg.d.to_string(), "121666");
    }

    #[test]
    fn weierstrass_flags() {
        let cfg = NamedCurve::Secp256r1.make_config::<u64>(Reduction::Barrett);
        assert!(cfg.a_is_minus_3);

        let cfg = NamedCurve::Edwards25519.make_config::<u64>(Reduction::Barrett);
        assert!(cfg.a_is_minus_1);

        let cfg = NamedCurve::Sect233k1.make_config::<u64>(Reduction::Barrett);
        assert!(cfg.a_is_zero && cfg.b_is_1);

        let cfg = NamedCurve::Sect163r2.make_config::<u64>(Reduction::Barrett);
        assert!(cfg.a_is_1);
    }
}
