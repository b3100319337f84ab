//! System tray front end.
//!
//! Owns the event loop: menu clicks are forwarded from the tray-icon
//! callback into the loop as user events, then routed through the
//! command dispatcher.

use anyhow::Result;
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tracing::error;
use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use crate::command::{CommandDispatcher, Flow, MenuCommand, status_line};

enum UserEvent {
    Menu(MenuEvent),
}

/// Run the tray event loop until the user quits.
pub fn run(dispatcher: CommandDispatcher) -> Result<()> {
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    MenuEvent::set_event_handler(Some(move |event| {
        let _ = proxy.send_event(UserEvent::Menu(event));
    }));

    let status_item = MenuItem::new(
        status_line(&dispatcher.controller().snapshot()),
        false,
        None,
    );
    let choose_item = MenuItem::new("Choose folder...", true, None);
    let open_item = MenuItem::new("Open watched folder", true, None);
    let start_item = MenuItem::new("Start monitoring", true, None);
    let pause_item = MenuItem::new("Pause monitoring", true, None);
    let stats_item = MenuItem::new("Today's stats", true, None);
    let quit_item = MenuItem::new("Quit", true, None);

    let menu = Menu::new();
    menu.append(&status_item)?;
    menu.append(&PredefinedMenuItem::separator())?;
    menu.append(&choose_item)?;
    menu.append(&open_item)?;
    menu.append(&PredefinedMenuItem::separator())?;
    menu.append(&start_item)?;
    menu.append(&pause_item)?;
    menu.append(&stats_item)?;
    menu.append(&PredefinedMenuItem::separator())?;
    menu.append(&quit_item)?;

    let mut tray_icon: Option<TrayIcon> = None;

    event_loop.run(move |event, _target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            // The icon is created once the loop is live; some platforms
            // reject tray registration before that.
            Event::NewEvents(StartCause::Init) => {
                let built = build_icon().and_then(|icon| {
                    TrayIconBuilder::new()
                        .with_menu(Box::new(menu.clone()))
                        .with_tooltip("dropwatch")
                        .with_icon(icon)
                        .build()
                        .map_err(Into::into)
                });

                match built {
                    Ok(icon) => {
                        tray_icon = Some(icon);
                        dispatcher.prompt_if_unconfigured();
                        let _ = status_item
                            .set_text(status_line(&dispatcher.controller().snapshot()));
                    }
                    Err(e) => {
                        error!("could not create the tray icon: {e}");
                        *control_flow = ControlFlow::Exit;
                    }
                }
            }
            Event::UserEvent(UserEvent::Menu(menu_event)) => {
                let command = if menu_event.id == choose_item.id() {
                    Some(MenuCommand::ChangePath(None))
                } else if menu_event.id == open_item.id() {
                    Some(MenuCommand::OpenFolder)
                } else if menu_event.id == start_item.id() {
                    Some(MenuCommand::Start)
                } else if menu_event.id == pause_item.id() {
                    Some(MenuCommand::Stop)
                } else if menu_event.id == stats_item.id() {
                    Some(MenuCommand::ShowStats)
                } else if menu_event.id == quit_item.id() {
                    Some(MenuCommand::Exit)
                } else {
                    None
                };

                if let Some(command) = command {
                    if dispatcher.dispatch(command) == Flow::Exit {
                        tray_icon.take();
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    let _ = status_item.set_text(status_line(&dispatcher.controller().snapshot()));
                }
            }
            _ => {}
        }
    })
}

/// Tray glyph drawn in code: a filled drop on a transparent square.
fn build_icon() -> Result<Icon> {
    const SIZE: i32 = 16;
    let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);

    for y in 0..SIZE {
        for x in 0..SIZE {
            let (dx, dy) = (x - SIZE / 2, y - 10);
            let in_bowl = dx * dx + dy * dy <= 25;
            let in_tip = y < 10 && dx.abs() <= (y - 2).max(0) / 2;
            let alpha = if in_bowl || in_tip { 255 } else { 0 };
            rgba.extend_from_slice(&[30, 144, 255, alpha]);
        }
    }

    Ok(Icon::from_rgba(rgba, 16, 16)?)
}
