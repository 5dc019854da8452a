use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coursebay::error::AppResult;
use coursebay::model::entity::{
    Course, CourseCreateUpdate, CourseStatus, Section, SectionCreateUpdate, SubSection,
    SubSectionCreateUpdate, UserEntity, UserEntityCreateUpdate,
};
use coursebay::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use coursebay::utils::uploads::{MediaFolder, MediaStore};
use coursebay::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the coursebay DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage sections
    Section {
        #[command(subcommand)]
        action: SectionCommands,
    },

    /// Manage lectures
    SubSection {
        #[command(subcommand)]
        action: SubSectionCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Admins can only be created here
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Admin, Instructor or Student
        #[arg(long, default_value = "Student")]
        role: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        /// Email of the owning instructor
        #[arg(long)]
        instructor_email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Whole currency units
        #[arg(long, default_value_t = 0)]
        price: i64,
        #[arg(long, default_value_t = false)]
        publish: bool,
    },
}

/// Section management
#[derive(Subcommand, Debug)]
pub enum SectionCommands {
    Add {
        /// Course name to attach the section to
        #[arg(long)]
        course_name: String,
        #[arg(long)]
        name: String,
    },
}

/// Lecture management
#[derive(Subcommand, Debug)]
pub enum SubSectionCommands {
    Add {
        #[arg(long)]
        course_name: String,
        /// Section name to attach the lecture to
        #[arg(long)]
        section_name: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Seconds
        #[arg(long)]
        duration: String,
        /// Path to the video file, copied into the uploads dir
        #[arg(long)]
        video: PathBuf,
        #[arg(long, default_value = "uploads")]
        uploads_dir: PathBuf,
    },
}

async fn course_id_by_name(mm: &ModelManager, name: &str) -> AppResult<uuid::Uuid> {
    let id = sqlx::query_scalar("SELECT id FROM courses WHERE course_name = $1")
        .bind(name)
        .fetch_one(mm.executor())
        .await
        .map_err(DatabaseError::SqlxError)?;
    Ok(id)
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let url = std::env::var("DATABASE_URL")
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    let db_con = DbConnection::connect(&url)?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { first_name, last_name, email, password, role } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate::new(
                        first_name,
                        last_name,
                        email.trim().to_lowercase(),
                        coursebay::auth::hash_password(&password)?,
                        UserRole::from(role.as_str()),
                    ),
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { instructor_email, name, description, price, publish } => {
                let instructor = UserEntity::find_by_email(&mm, &actor, &instructor_email)
                    .await?
                    .ok_or_else(|| {
                        std::io::Error::new(std::io::ErrorKind::NotFound, "no such instructor")
                    })?;
                let owner = AuthenticatedUser::new(instructor.id(), instructor.role());

                let course = Course::create(
                    &mm,
                    &owner,
                    CourseCreateUpdate {
                        course_name: name,
                        course_description: description,
                        what_you_will_learn: String::new(),
                        price,
                        thumbnail: None,
                        tags: vec![],
                        instructions: vec![],
                        status: Some(if publish { CourseStatus::Published } else { CourseStatus::Draft }),
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Section { action } => match action {
            SectionCommands::Add { course_name, name } => {
                let course_id = course_id_by_name(&mm, &course_name).await?;
                let section = Section::create(
                    &mm,
                    &actor,
                    SectionCreateUpdate {
                        course_id,
                        section_name: name,
                    },
                )
                .await?;
                println!("Section created: {:?}", section);
            }
        },

        Commands::SubSection { action } => match action {
            SubSectionCommands::Add {
                course_name,
                section_name,
                title,
                description,
                duration,
                video,
                uploads_dir,
            } => {
                let course_id = course_id_by_name(&mm, &course_name).await?;
                let section_id: uuid::Uuid = sqlx::query_scalar(
                    "SELECT id FROM sections WHERE course_id = $1 AND section_name = $2",
                )
                .bind(course_id)
                .bind(&section_name)
                .fetch_one(mm.executor())
                .await
                .map_err(DatabaseError::SqlxError)?;

                let bytes = std::fs::read(&video)?;
                let file_name = video
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                let video_url = MediaStore::new(uploads_dir)
                    .save(MediaFolder::Videos, &file_name, &bytes)
                    .await?;

                let sub_section = SubSection::create(
                    &mm,
                    &actor,
                    SubSectionCreateUpdate {
                        section_id,
                        title,
                        description,
                        time_duration: duration,
                        video_url,
                    },
                )
                .await?;
                println!("Lecture created: {:?}", sub_section);
            }
        },
    }

    Ok(())
}
