#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // The line parser must never panic; malformed lines are simply None.
    for channel_count in [1usize, 4, 16] {
        if let Some(sample) = loadcell_core::parse_line(data, channel_count) {
            assert_eq!(sample.channels.len(), channel_count);
        }
    }
});
