pub mod connect_form;
pub mod feed_panel;
pub mod help_bar;
pub mod input_box;
pub mod popup;
pub mod status_bar;
