use axum::extract::Multipart;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::{
        DatabaseResult, ModelManager, ResourceTyped,
        entity::{Course, Section, SubSection, UserEntity},
    },
    web::{AuthenticatedUser, WebError, WebResult, dto::non_blank},
};

/// Lecture as shown in the public catalogue: no video link.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubSectionOutline {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub time_duration: String,
}

impl From<&SubSection> for SubSectionOutline {
    fn from(value: &SubSection) -> Self {
        Self {
            id: value.id(),
            title: value.title().to_string(),
            description: value.description().to_string(),
            time_duration: value.time_duration().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SectionOutline {
    pub id: Uuid,
    pub section_name: String,
    pub sub_sections: Vec<SubSectionOutline>,
}

impl From<&SectionContent> for SectionOutline {
    fn from(value: &SectionContent) -> Self {
        Self {
            id: value.id,
            section_name: value.section_name.clone(),
            sub_sections: value.sub_sections.iter().map(SubSectionOutline::from).collect(),
        }
    }
}

/// A section together with its lectures, video links included.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SectionContent {
    pub id: Uuid,
    pub section_name: String,
    pub sub_sections: Vec<SubSection>,
}

impl SectionContent {
    /// Attaches each lecture to its section, keeping the input order of both.
    pub fn group(sections: Vec<Section>, sub_sections: Vec<SubSection>) -> Vec<Self> {
        let mut grouped: Vec<Self> = sections
            .into_iter()
            .map(|s| Self {
                id: s.id(),
                section_name: s.section_name().to_string(),
                sub_sections: vec![],
            })
            .collect();

        for sub_section in sub_sections {
            if let Some(section) = grouped.iter_mut().find(|s| s.id == sub_section.section_id()) {
                section.sub_sections.push(sub_section);
            }
        }

        grouped
    }

    pub async fn load_for_course(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let (sections, sub_sections) = tokio::try_join!(
            Section::all_by_course(mm, actor, course_id),
            SubSection::all_by_course(mm, actor, course_id),
        )?;
        Ok(Self::group(sections, sub_sections))
    }

    pub async fn load_for_section(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        section: &Section,
    ) -> DatabaseResult<Self> {
        let sub_sections = SubSection::all_by_section(mm, actor, section.id()).await?;
        Ok(Self {
            id: section.id(),
            section_name: section.section_name().to_string(),
            sub_sections,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct InstructorSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub image: String,
    pub about: Option<String>,
}

impl From<&UserEntity> for InstructorSummary {
    fn from(value: &UserEntity) -> Self {
        Self {
            id: value.id(),
            first_name: value.first_name().to_string(),
            last_name: value.last_name().to_string(),
            image: value.image().to_string(),
            about: value.about().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseDetailsResponse {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: Option<InstructorSummary>,
    pub sections: Vec<SectionOutline>,
    pub total_lectures: usize,
    pub total_students: i64,
    pub average_rating: f64,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseFullResponse {
    #[serde(flatten)]
    pub course: Course,
    pub sections: Vec<SectionContent>,
    pub completed_videos: Vec<Uuid>,
    pub progress_percentage: f64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SectionBody {
    pub section_name: String,
}

/// Upload form for a lecture. Every field is optional here; creation checks
/// that all of them are present.
#[derive(Debug, Default)]
pub struct SubSectionForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_duration: Option<String>,
    pub video: Option<UploadedFile>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn has_media_type(&self, prefix: &str) -> bool {
        self.content_type
            .as_deref()
            .map(|c| c.starts_with(prefix))
            .unwrap_or(false)
    }
}

/// Multipart schema used only for the generated docs.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubSectionUpload {
    pub title: String,
    pub description: String,
    pub time_duration: String,
    #[schema(value_type = String, format = Binary)]
    pub video: Vec<u8>,
}

impl SubSectionForm {
    pub async fn from_multipart(mut multipart: Multipart) -> WebResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| WebError::resource_bad_request(SubSection::get_resource_type(), e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "video" => {
                    let file_name = field.file_name().unwrap_or("video").to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| {
                        WebError::resource_bad_request(SubSection::get_resource_type(), e.body_text())
                    })?;
                    form.video = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                "title" | "description" | "time_duration" => {
                    let text = field.text().await.map_err(|e| {
                        WebError::resource_bad_request(SubSection::get_resource_type(), e.body_text())
                    })?;
                    let value = non_blank(Some(&text)).map(str::to_string);
                    match name.as_str() {
                        "title" => form.title = value,
                        "description" => form.description = value,
                        _ => form.time_duration = value,
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Reads a single file field out of a multipart body.
pub async fn read_file_field(mut multipart: Multipart, field_name: &str) -> WebResult<Option<UploadedFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::resource_bad_request(UserEntity::get_resource_type(), e.body_text()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or(field_name).to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::resource_bad_request(UserEntity::get_resource_type(), e.body_text()))?;
        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn section(id: Uuid, name: &str, order: i32) -> Section {
        serde_json::from_value(json!({
            "id": id,
            "course_id": Uuid::nil(),
            "section_name": name,
            "order_index": order,
        }))
        .unwrap()
    }

    fn sub_section(section_id: Uuid, title: &str) -> SubSection {
        serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "section_id": section_id,
            "title": title,
            "description": "d",
            "time_duration": "60",
            "video_url": "/api/v1/static/videos/a.mp4",
            "order_index": 0,
        }))
        .unwrap()
    }

    #[test]
    fn group_test() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let grouped = SectionContent::group(
            vec![section(a, "Intro", 0), section(b, "Deep dive", 1)],
            vec![
                sub_section(a, "Welcome"),
                sub_section(b, "Ownership"),
                sub_section(a, "Setup"),
                sub_section(Uuid::new_v4(), "Orphan"),
            ],
        );

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].section_name, "Intro");
        let titles: Vec<&str> = grouped[0].sub_sections.iter().map(|s| s.title()).collect();
        assert_eq!(titles, vec!["Welcome", "Setup"]);
        assert_eq!(grouped[1].sub_sections.len(), 1);
    }

    #[test]
    fn outline_hides_video_test() {
        let a = Uuid::new_v4();
        let grouped = SectionContent::group(vec![section(a, "Intro", 0)], vec![sub_section(a, "Welcome")]);
        let outline = SectionOutline::from(&grouped[0]);

        let json = serde_json::to_string(&outline).unwrap();
        assert!(!json.contains("video_url"));
        assert!(json.contains("Welcome"));

        let json = serde_json::to_string(&grouped[0]).unwrap();
        assert!(json.contains("video_url"));
    }
}
