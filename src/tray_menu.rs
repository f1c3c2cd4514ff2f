use crate::commands;
use tauri::{
    menu::{MenuBuilder, MenuEvent, MenuItemBuilder},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Wry,
};

const TRAY_ID: &str = "main";
const MENU_SHOW_ID: &str = "show";
const MENU_QUIT_ID: &str = "quit";

fn build_tray_menu(app: &AppHandle<Wry>) -> tauri::Result<tauri::menu::Menu<Wry>> {
    let show = MenuItemBuilder::with_id(MENU_SHOW_ID, "Show").build(app)?;
    let quit = MenuItemBuilder::with_id(MENU_QUIT_ID, "Quit").build(app)?;

    MenuBuilder::new(app)
        .item(&show)
        .separator()
        .item(&quit)
        .build()
}

pub fn create_tray(app: &AppHandle<Wry>) -> tauri::Result<()> {
    let menu = build_tray_menu(app)?;

    let mut builder = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(handle_menu_event)
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                show_main(tray.app_handle());
            }
        });

    if let Some(icon) = app.default_window_icon() {
        builder = builder.icon(icon.clone());
    }
    if let Some(name) = app.config().product_name.as_deref() {
        builder = builder.tooltip(name);
    }

    builder.build(app)?;
    Ok(())
}

fn show_main(app: &AppHandle<Wry>) {
    let _ = commands::window::reveal_main_window(app);
}

fn handle_menu_event(app: &AppHandle<Wry>, event: MenuEvent) {
    match event.id().as_ref() {
        MENU_SHOW_ID => show_main(app),
        MENU_QUIT_ID => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                let _ = commands::window::quit_app(app).await;
            });
        }
        _ => {}
    }
}
