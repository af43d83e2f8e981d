mod home;
mod upload;

pub use home::HomeView;
pub use upload::UploadView;
