//! Filtering reads on their phred-encoded base qualities

use crate::{DedupError, DedupResult, DEFAULT_PHRED_OFFSET};

/// Error rate for each phred score: `10^(-score / 10)`
///
/// This table was automatically generated.
#[rustfmt::skip]
static SCORE_TO_ERROR_RATE: [f64; 128] = [
    1.0,                     // 0
    0.7943282347242815,      // 1
    0.6309573444801932,      // 2
    0.5011872336272722,      // 3
    0.3981071705534972,      // 4
    0.31622776601683794,     // 5
    0.251188643150958,       // 6
    0.19952623149688797,     // 7
    0.15848931924611134,     // 8
    0.12589254117941673,     // 9
    0.1,                     // 10
    0.07943282347242814,     // 11
    0.06309573444801933,     // 12
    0.05011872336272722,     // 13
    0.039810717055349734,    // 14
    0.03162277660168379,     // 15
    0.025118864315095794,    // 16
    0.0199526231496888,      // 17
    0.015848931924611134,    // 18
    0.012589254117941675,    // 19
    0.01,                    // 20
    0.007943282347242814,    // 21
    0.00630957344480193,     // 22
    0.005011872336272725,    // 23
    0.003981071705534973,    // 24
    0.0031622776601683794,   // 25
    0.0025118864315095794,   // 26
    0.001995262314968879,    // 27
    0.001584893192461114,    // 28
    0.0012589254117941675,   // 29
    0.001,                   // 30
    0.0007943282347242813,   // 31
    0.000630957344480193,    // 32
    0.0005011872336272725,   // 33
    0.00039810717055349735,  // 34
    0.00031622776601683794,  // 35
    0.00025118864315095795,  // 36
    0.00019952623149688788,  // 37
    0.00015848931924611142,  // 38
    0.00012589254117941674,  // 39
    0.0001,                  // 40
    7.943282347242822e-05,   // 41
    6.309573444801929e-05,   // 42
    5.011872336272725e-05,   // 43
    3.9810717055349695e-05,  // 44
    3.1622776601683795e-05,  // 45
    2.5118864315095822e-05,  // 46
    1.9952623149688786e-05,  // 47
    1.584893192461114e-05,   // 48
    1.2589254117941661e-05,  // 49
    1e-05,                   // 50
    7.943282347242822e-06,   // 51
    6.30957344480193e-06,    // 52
    5.011872336272725e-06,   // 53
    3.981071705534969e-06,   // 54
    3.162277660168379e-06,   // 55
    2.5118864315095823e-06,  // 56
    1.9952623149688787e-06,  // 57
    1.584893192461114e-06,   // 58
    1.2589254117941661e-06,  // 59
    1e-06,                   // 60
    7.943282347242822e-07,   // 61
    6.30957344480193e-07,    // 62
    5.011872336272725e-07,   // 63
    3.981071705534969e-07,   // 64
    3.162277660168379e-07,   // 65
    2.5118864315095823e-07,  // 66
    1.9952623149688787e-07,  // 67
    1.584893192461114e-07,   // 68
    1.2589254117941662e-07,  // 69
    1e-07,                   // 70
    7.943282347242822e-08,   // 71
    6.30957344480193e-08,    // 72
    5.011872336272725e-08,   // 73
    3.981071705534969e-08,   // 74
    3.162277660168379e-08,   // 75
    2.511886431509582e-08,   // 76
    1.9952623149688786e-08,  // 77
    1.5848931924611143e-08,  // 78
    1.2589254117941661e-08,  // 79
    1e-08,                   // 80
    7.943282347242822e-09,   // 81
    6.309573444801943e-09,   // 82
    5.011872336272715e-09,   // 83
    3.981071705534969e-09,   // 84
    3.1622776601683795e-09,  // 85
    2.511886431509582e-09,   // 86
    1.9952623149688828e-09,  // 87
    1.584893192461111e-09,   // 88
    1.2589254117941663e-09,  // 89
    1e-09,                   // 90
    7.943282347242822e-10,   // 91
    6.309573444801942e-10,   // 92
    5.011872336272714e-10,   // 93
    3.9810717055349694e-10,  // 94
    3.1622776601683795e-10,  // 95
    2.511886431509582e-10,   // 96
    1.9952623149688828e-10,  // 97
    1.584893192461111e-10,   // 98
    1.2589254117941662e-10,  // 99
    1e-10,                   // 100
    7.943282347242822e-11,   // 101
    6.309573444801942e-11,   // 102
    5.011872336272715e-11,   // 103
    3.9810717055349695e-11,  // 104
    3.1622776601683794e-11,  // 105
    2.5118864315095823e-11,  // 106
    1.9952623149688828e-11,  // 107
    1.5848931924611107e-11,  // 108
    1.2589254117941662e-11,  // 109
    1e-11,                   // 110
    7.943282347242821e-12,   // 111
    6.309573444801943e-12,   // 112
    5.011872336272715e-12,   // 113
    3.9810717055349695e-12,  // 114
    3.1622776601683794e-12,  // 115
    2.5118864315095823e-12,  // 116
    1.9952623149688827e-12,  // 117
    1.584893192461111e-12,   // 118
    1.258925411794166e-12,   // 119
    1e-12,                   // 120
    7.943282347242822e-13,   // 121
    6.309573444801942e-13,   // 122
    5.011872336272715e-13,   // 123
    3.981071705534969e-13,   // 124
    3.162277660168379e-13,   // 125
    2.511886431509582e-13,   // 126
    1.9952623149688827e-13,  // 127
];

/// Filters reads by their average base-call error rate
///
/// Phred scores encode the probability of a wrong base call as
/// `10^(-score / 10)`. The filter decodes every score of a quality
/// string, averages the error rates and accepts the read when the
/// average does not exceed the threshold. Averaging error rates (not
/// scores) means a single terrible base weighs much more than many
/// mediocre ones.
///
/// The filter keeps running counters of seen and accepted reads.
///
/// # Examples
///
/// ```
/// use seqdedup::QualityFilter;
///
/// // accept reads averaging phred 20 or better
/// let mut filter = QualityFilter::new(0.01);
///
/// assert!(filter.passes("IIIIIIII").unwrap());
/// assert!(!filter.passes("II!!!!II").unwrap());
///
/// assert_eq!(filter.total(), 2);
/// assert_eq!(filter.passed(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct QualityFilter {
    threshold: f64,
    phred_offset: u8,
    total: usize,
    passed: usize,
}

impl QualityFilter {
    /// Creates a filter with the given error-rate threshold and the
    /// standard Sanger/Illumina phred offset of 33
    pub fn new(threshold: f64) -> Self {
        Self::with_phred_offset(threshold, DEFAULT_PHRED_OFFSET)
    }

    /// Creates a filter with a custom phred offset
    pub fn with_phred_offset(threshold: f64, phred_offset: u8) -> Self {
        Self {
            threshold,
            phred_offset,
            total: 0,
            passed: 0,
        }
    }

    /// Checks a quality string against the threshold
    ///
    /// Empty quality strings pass: there is no base that could be
    /// wrong.
    ///
    /// # Errors
    ///
    /// [`DedupError::BadPhred`] for characters outside
    /// `[phred_offset, 126]`.
    pub fn passes(&mut self, qualities: &str) -> DedupResult<bool> {
        let mut total_error_rate = 0.0;
        for &score in qualities.as_bytes() {
            if score < self.phred_offset || score > 126 {
                return Err(DedupError::BadPhred(char::from(score)));
            }
            total_error_rate += SCORE_TO_ERROR_RATE[usize::from(score - self.phred_offset)];
        }
        let passed =
            qualities.is_empty() || total_error_rate / qualities.len() as f64 <= self.threshold;
        self.total += 1;
        if passed {
            self.passed += 1;
        }
        Ok(passed)
    }

    /// Returns the error-rate threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the configured phred offset
    pub fn phred_offset(&self) -> u8 {
        self.phred_offset
    }

    /// Returns the number of checked reads
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the number of reads that passed the filter
    pub fn passed(&self) -> usize {
        self.passed
    }
}
