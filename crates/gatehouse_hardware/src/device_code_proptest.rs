#[cfg(test)]
mod tests {
    use crate::device_code::{generate_device_code, generate_device_code_with, is_suggested_shape};
    use gatehouse_common::DeviceType;
    use proptest::prelude::*;
    use proptest::sample::select;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    proptest! {
        #[test]
        fn test_generated_codes_have_suggested_shape(
            device_type in select(DeviceType::ALL.to_vec()),
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let code = generate_device_code_with(device_type, &mut rng);
            prop_assert!(is_suggested_shape(&code), "bad code: {}", code);
        }

        #[test]
        fn test_same_seed_same_code(
            device_type in select(DeviceType::ALL.to_vec()),
            seed in any::<u64>(),
        ) {
            let first = generate_device_code_with(device_type, &mut StdRng::seed_from_u64(seed));
            let second = generate_device_code_with(device_type, &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn test_thread_rng_codes_keep_type_prefix() {
        for device_type in DeviceType::ALL {
            let code = generate_device_code(device_type);
            assert!(is_suggested_shape(&code));
            assert!(code.starts_with(&crate::device_code::code_prefix(device_type)));
        }
    }
}
