use serde::Deserialize;

use crate::web::dto::non_blank;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ContactBody {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl ContactBody {
    /// Phone number with its country code, empty when not given.
    pub fn phone(&self) -> String {
        match (non_blank(self.country_code.as_deref()), non_blank(self.phone_no.as_deref())) {
            (Some(code), Some(number)) => format!("{code} {number}"),
            (None, Some(number)) => number.to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn phone_test() {
        let mut body: ContactBody = serde_json::from_str(r#"{"email":"a@b.c","message":"hi"}"#).unwrap();
        assert_eq!(body.phone(), "");

        body.phone_no = Some(String::from("9876543210"));
        assert_eq!(body.phone(), "9876543210");

        body.country_code = Some(String::from("+91"));
        assert_eq!(body.phone(), "+91 9876543210");
    }
}
