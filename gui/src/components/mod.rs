// GUI components
pub mod backtest_panel;
pub mod chart;
pub mod command_palette;
pub mod indicator_menu;
pub mod search_bar;
pub mod sidebar;
pub mod toolbar;
