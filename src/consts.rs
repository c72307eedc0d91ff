/// Height assumed when deriving BMI from the weight slider, in metres.
pub const ASSUMED_HEIGHT_M: f64 = 1.75;

/// Number of points kept on the risk chart.
pub const SERIES_CAPACITY: usize = 10;

/// Age above which the boost multiplier starts to grow.
pub const AGE_BOOST_THRESHOLD: f64 = 50.0;
/// Multiplier increase per year above [`AGE_BOOST_THRESHOLD`].
pub const AGE_BOOST_PER_YEAR: f64 = 0.02;

/// Weight (kg) above which the boost multiplier starts to grow.
pub const WEIGHT_BOOST_THRESHOLD: f64 = 80.0;
/// Multiplier increase per kg above [`WEIGHT_BOOST_THRESHOLD`].
pub const WEIGHT_BOOST_PER_KG: f64 = 0.015;

pub const LOCAL_API_URL: &str = "http://127.0.0.1:5000";
pub const WHATIF_PREDICT_PATH: &str = "/whatif_predict";
