//! Record builders shared by the unit tests.

use crisis_lens_call_models::CallRecord;

/// A record with coordinates in Montgomery County and no location filters.
pub fn call(id: &str, timestamp: &str, emergency_type: &str, age: i64, gender: &str) -> CallRecord {
    CallRecord {
        id: id.to_string(),
        timestamp: timestamp.to_string(),
        emergency_type: emergency_type.to_string(),
        emergency_subtype: None,
        caller_age: Some(age),
        caller_gender: gender.to_string(),
        latitude: Some(40.297_875_9),
        longitude: Some(-75.581_293_5),
        township: String::new(),
        zipcode: String::new(),
        description: None,
        response_time: None,
    }
}

/// Sets the township and postal code of a test record.
pub trait At {
    fn at(self, township: &str, zipcode: &str) -> Self;
}

impl At for CallRecord {
    fn at(mut self, township: &str, zipcode: &str) -> Self {
        self.township = township.to_string();
        self.zipcode = zipcode.to_string();
        self
    }
}
