use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    model::entity::{Course, UserEntityCreateUpdate},
    web::dto::non_blank,
};

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileBody {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub about: Option<String>,
    pub contact_number: Option<String>,
}

impl UpdateProfileBody {
    /// Applies the provided fields on top of the stored ones.
    pub fn apply(self, mut data: UserEntityCreateUpdate) -> UserEntityCreateUpdate {
        if let Some(first_name) = non_blank(self.first_name.as_deref()) {
            data.first_name = first_name.to_string();
        }
        if let Some(last_name) = non_blank(self.last_name.as_deref()) {
            data.last_name = last_name.to_string();
        }
        if let Some(gender) = self.gender {
            data.gender = Some(gender);
        }
        if let Some(date_of_birth) = self.date_of_birth {
            data.date_of_birth = Some(date_of_birth);
        }
        if let Some(about) = self.about {
            data.about = Some(about);
        }
        if let Some(contact_number) = self.contact_number {
            data.contact_number = Some(contact_number);
        }
        data
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EnrolledCourseResponse {
    #[serde(flatten)]
    pub course: Course,
    pub total_sub_sections: i64,
    pub completed_sub_sections: i64,
    pub progress_percentage: f64,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::web::UserRole;

    #[test]
    fn partial_update_test() {
        let stored = UserEntityCreateUpdate::new(
            String::from("Ada"),
            String::from("Lovelace"),
            String::from("ada@example.com"),
            String::from("hash"),
            UserRole::Student,
        );

        let body = UpdateProfileBody {
            last_name: Some(String::from("  King ")),
            first_name: Some(String::from("   ")),
            about: Some(String::from("Analyst")),
            ..Default::default()
        };
        let updated = body.apply(stored);

        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.last_name, "King");
        assert_eq!(updated.about.as_deref(), Some("Analyst"));
        assert_eq!(updated.gender, None);
        assert_eq!(updated.email, "ada@example.com");
    }
}
