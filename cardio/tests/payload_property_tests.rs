//! Property tests for payload serialization.

use proptest::prelude::*;

use cardio_rust::models::{Field, PredictionRequest};

fn any_request() -> impl Strategy<Value = PredictionRequest> {
    prop::collection::vec(-1000.0f64..1000.0, 12).prop_map(|values| {
        let mut request = PredictionRequest::default();
        for (field, value) in Field::ALL.into_iter().zip(values) {
            request.set(field, value);
        }
        request
    })
}

proptest! {
    #[test]
    fn payload_has_exactly_the_twelve_wire_keys(request in any_request()) {
        let value = serde_json::to_value(request).unwrap();
        let object = value.as_object().unwrap();

        prop_assert_eq!(object.len(), 12);
        for (field, expected) in request.entries() {
            let actual = object.get(field.wire_name()).and_then(|v| v.as_f64());
            prop_assert_eq!(actual, Some(expected));
        }
    }
}
