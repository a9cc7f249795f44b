#![no_main]

use covert_metrics::config::AnalysisConfig;
use covert_metrics::diagnostics::Diagnostics;
use covert_metrics::parser::{sequence_trials, DetectorParser, PingParser, TrialParser};

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Every extractor must tolerate arbitrary text without panicking
    if let Ok(input) = std::str::from_utf8(data) {
        let config = AnalysisConfig::default();

        if let Ok(parser) = TrialParser::from_config(&config) {
            let mut records = parser.parse(input);
            sequence_trials(&mut records);
        }

        if let Ok(parser) = DetectorParser::from_config(&config) {
            let mut diagnostics = Diagnostics::new();
            let _ = parser.parse_narrative(input, "fuzz", &mut diagnostics);
            let _ = parser.parse_assessments(input);
        }

        if let Ok(parser) = PingParser::new() {
            let _ = parser.parse_run(input, input);
        }
    }
});
