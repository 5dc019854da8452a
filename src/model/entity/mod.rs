mod user;
pub use user::{UserEntity, UserEntityCreateUpdate, default_avatar};

mod course;
pub use course::{Course, CourseCreateUpdate, CourseStatus, InstructorCourseStatsRow};

mod section;
pub use section::{Section, SectionCreateUpdate};

mod sub_section;
pub use sub_section::{SubSection, SubSectionCreateUpdate};

mod course_progress;
pub use course_progress::{CourseProgress, progress_percentage};

mod rating;
pub use rating::{RatingAndReview, RatingAndReviewCreate, ReviewWithAuthorRow};

mod live_class;
pub use live_class::{LiveClass, LiveClassCreate, UpcomingLiveClassRow};

mod payment_order;
pub use payment_order::{EnrollmentOutcome, PaymentOrder, PaymentOrderCreate};
