pub mod ports;
pub mod process_frame_use_case;

pub use process_frame_use_case::ProcessFrameUseCase;
