pub mod batch_form;
pub mod caption_panel;
pub mod central_panel;
pub mod items_panel;
pub mod settings_window;
pub mod tools_panel;

pub use batch_form::BatchForm;
pub use caption_panel::caption_panel;
pub use central_panel::central_panel;
pub use items_panel::items_panel;
pub use settings_window::settings_window;
pub use tools_panel::tools_panel;
