#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(values) = forcebench_config::parse_setpoints_txt(data) {
        assert!(values.len() <= data.len());
    }
});
