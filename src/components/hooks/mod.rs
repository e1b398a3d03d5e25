pub mod use_widget_id;
