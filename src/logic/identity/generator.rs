//! Identity Generation
//!
//! Produces the simulated network identity components: a proxy address in
//! `192.168.0.0/16` and a locally administered, unicast MAC-style hardware id.

use rand::Rng;

/// Random proxy address, `192.168.x.y` with `y` in 1..=254
pub fn generate_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("192.168.{}.{}", rng.gen_range(0..=255u8), rng.gen_range(1..=254u8))
}

/// Random hardware id formatted as a MAC address.
///
/// First octet has the locally-administered bit set and the multicast bit clear.
pub fn generate_hardware_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut octets = [0u8; 6];
    rng.fill(&mut octets);
    octets[0] = (octets[0] | 0x02) & 0xFE;

    octets
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_address_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let addr = generate_address(&mut rng);
            let parts: Vec<u16> = addr.split('.').map(|p| p.parse().unwrap()).collect();
            assert_eq!(parts.len(), 4);
            assert_eq!(&parts[..2], &[192, 168]);
            assert!((1..=254).contains(&parts[3]));
        }
    }

    #[test]
    fn test_hardware_id_is_local_unicast_mac() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let hwid = generate_hardware_id(&mut rng);
            let octets: Vec<u8> = hwid
                .split(':')
                .map(|o| u8::from_str_radix(o, 16).unwrap())
                .collect();
            assert_eq!(octets.len(), 6);
            assert_eq!(octets[0] & 0x02, 0x02);
            assert_eq!(octets[0] & 0x01, 0x00);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(generate_address(&mut a), generate_address(&mut b));
        assert_eq!(generate_hardware_id(&mut a), generate_hardware_id(&mut b));
    }
}
