//! Interactive session rendering.
//!
//! Every frame is drawn in full from the current [`App`] state. Rendering
//! reads the state and nothing else, so drawing twice without a state
//! change produces the same frame.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::app::{App, MessageKind, Mode, StatusMessage};
use crate::output::{column_width, process_noun, shorten_path};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Min(0),    // table, prompts, status message
            Constraint::Length(2), // key legend
        ])
        .split(f.area());

    draw_header(f, chunks[0]);
    draw_body(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        "  devkill".bold(),
        " \u{2014} interactive mode".dim(),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

fn draw_body(f: &mut Frame, app: &App, area: Rect) {
    if app.processes.is_empty() {
        let mut lines = vec![Line::from(
            format!("  No dev servers found on ports {}.", app.range).dim(),
        )];
        // a kill-all confirmation or refresh error still needs to show
        // after the list empties out
        if let Some(message) = &app.message {
            lines.push(Line::default());
            lines.push(message_line(message));
        }
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    let port_width = column_width(4, app.processes.iter().map(|p| p.port.to_string().len()));
    let pid_width = column_width(3, app.processes.iter().map(|p| p.pid.to_string().len()));
    let fw_width = column_width(7, app.processes.iter().map(|p| p.framework.len()));

    let mut lines = Vec::new();

    lines.push(Line::from(
        format!(
            "  {:<pw$}  {:<iw$}  {:<fw$}  DIRECTORY",
            "PORT",
            "PID",
            "PROCESS",
            pw = port_width,
            iw = pid_width,
            fw = fw_width,
        )
        .bold(),
    ));
    lines.push(Line::from(
        format!(
            "  {}  {}  {}  {}",
            "\u{2500}".repeat(port_width),
            "\u{2500}".repeat(pid_width),
            "\u{2500}".repeat(fw_width),
            "\u{2500}".repeat(30),
        )
        .dim(),
    ));

    for (i, proc) in app.processes.iter().enumerate() {
        let dir = shorten_path(&proc.cwd);

        if i == app.selected {
            lines.push(Line::from(
                format!(
                    "  {:<pw$}  {:<iw$}  {:<fw$}  {}  ",
                    proc.port,
                    proc.pid,
                    proc.framework,
                    dir,
                    pw = port_width,
                    iw = pid_width,
                    fw = fw_width,
                )
                .reversed()
                .bold(),
            ));
            if app.mode == Mode::ActionMenu {
                lines.push(action_legend());
            }
        } else {
            lines.push(Line::from(vec![
                Span::raw("  "),
                format!("{:<pw$}", proc.port, pw = port_width).cyan(),
                Span::raw("  "),
                format!("{:<iw$}", proc.pid, iw = pid_width).dim(),
                Span::raw("  "),
                format!("{:<fw$}", proc.framework, fw = fw_width).green(),
                Span::raw("  "),
                dir.dark_gray(),
            ]));
        }
    }

    if app.mode == Mode::ConfirmKillAll {
        lines.push(Line::default());
        lines.push(confirm_prompt(app.processes.len()));
    }

    if let Some(message) = &app.message {
        lines.push(Line::default());
        lines.push(message_line(message));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let text = if app.processes.is_empty() {
        "  Press r to refresh \u{b7} q to quit"
    } else {
        "  \u{2191}/\u{2193} navigate \u{b7} Enter select \u{b7} K kill all \u{b7} r refresh \u{b7} q quit"
    };
    let footer = vec![Line::default(), Line::from(text.dim())];
    f.render_widget(Paragraph::new(footer), area);
}

fn action_legend() -> Line<'static> {
    Line::from(vec![
        "    [o]".cyan(),
        Span::raw(" Open  "),
        "[c]".cyan(),
        Span::raw(" VS Code  "),
        "[k]".cyan(),
        Span::raw(" Kill  "),
        "[Esc] Back".dim(),
    ])
}

fn confirm_prompt(count: usize) -> Line<'static> {
    Line::from(vec![
        format!("  Kill all {count} {}? ", process_noun(count)).red().bold(),
        "[y]".cyan(),
        Span::raw(" Yes  "),
        "[n]".cyan(),
        Span::raw(" No"),
    ])
}

fn message_line(message: &StatusMessage) -> Line<'static> {
    let text = message.text.clone();
    match message.kind {
        MessageKind::Success => Line::from(vec!["  \u{2713} ".green(), Span::raw(text)]),
        MessageKind::Warning => Line::from(vec!["  \u{26a0} ".yellow(), Span::raw(text)]),
        MessageKind::Error => Line::from(vec!["  \u{2717} ".red(), Span::raw(text)]),
        MessageKind::Info => Line::from(format!("  {text}").dim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::StatusMessage;
    use devkill_core::{PortEntry, ProcessInfo, ScanRange};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn proc_fixture(port: u16, pid: u32, framework: &str) -> ProcessInfo {
        ProcessInfo::new(
            PortEntry::new(port, pid, "node"),
            "/srv/web",
            "node server.js",
            framework,
        )
    }

    fn app_with(count: usize) -> App {
        let mut app = App::new(ScanRange::default());
        app.processes = (0..count)
            .map(|i| proc_fixture(3000 + i as u16, 100 + i as u32, "Node"))
            .collect();
        app
    }

    fn render(app: &App) -> Vec<String> {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        buffer_lines(terminal.backend().buffer())
    }

    fn buffer_lines(buffer: &Buffer) -> Vec<String> {
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_header_and_footer() {
        let lines = render(&app_with(1));

        assert!(lines[0].contains("devkill"));
        assert!(lines[0].contains("interactive mode"));
        assert!(lines[23].contains("Enter select"));
        assert!(lines[23].contains("K kill all"));
    }

    #[test]
    fn test_empty_state() {
        let lines = render(&app_with(0));

        assert!(lines[2].contains("No dev servers found on ports 3000\u{2013}9000."));
        assert!(lines[23].contains("Press r to refresh"));
        assert!(!lines.join("\n").contains("PORT"));
    }

    #[test]
    fn test_empty_state_still_shows_message() {
        let mut app = app_with(0);
        app.set_message(StatusMessage::success("Killed all 2 processes"));

        let lines = render(&app);
        assert!(lines[2].contains("No dev servers found"));
        assert_eq!(lines[3], "");
        assert!(lines[4].contains("\u{2713} Killed all 2 processes"));
    }

    #[test]
    fn test_empty_state_surfaces_refresh_errors() {
        let mut app = app_with(0);
        app.set_message(StatusMessage::error(
            "Refresh failed: Command execution failed: lsof",
        ));

        let joined = render(&app).join("\n");
        assert!(joined.contains("\u{2717} Refresh failed"));
    }

    #[test]
    fn test_table_rows() {
        let lines = render(&app_with(2));

        assert!(lines[2].starts_with("  PORT  PID  PROCESS  DIRECTORY"));
        assert!(lines[3].contains("\u{2500}"));
        assert!(lines[4].starts_with("  3000  100  Node"));
        assert!(lines[5].starts_with("  3001  101  Node"));
        assert!(lines[4].contains("/srv/web"));
    }

    #[test]
    fn test_selected_row_is_inverted() {
        let mut app = app_with(2);
        app.selected = 1;

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let buffer = terminal.backend().buffer();

        // rows start at y=4: header chunk is two lines, then column
        // header and divider
        assert!(!buffer[(2, 4)].modifier.contains(Modifier::REVERSED));
        assert!(buffer[(2, 5)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_action_menu_legend_sits_under_selected_row() {
        let mut app = app_with(3);
        app.selected = 1;
        app.mode = Mode::ActionMenu;

        let lines = render(&app);

        assert!(lines[5].starts_with("  3001"));
        assert!(lines[6].contains("[o] Open"));
        assert!(lines[6].contains("[c] VS Code"));
        assert!(lines[6].contains("[k] Kill"));
        assert!(lines[6].contains("[Esc] Back"));
        assert!(lines[7].starts_with("  3002"));
    }

    #[test]
    fn test_confirm_prompt_follows_table() {
        let mut app = app_with(2);
        app.mode = Mode::ConfirmKillAll;

        let lines = render(&app);

        assert_eq!(lines[6], "");
        assert!(lines[7].contains("Kill all 2 processes?"));
        assert!(lines[7].contains("[y] Yes"));
        assert!(lines[7].contains("[n] No"));
    }

    #[test]
    fn test_confirm_prompt_singular() {
        let mut app = app_with(1);
        app.mode = Mode::ConfirmKillAll;

        let joined = render(&app).join("\n");
        assert!(joined.contains("Kill all 1 process?"));
    }

    #[test]
    fn test_status_message_glyphs() {
        let mut app = app_with(1);

        app.set_message(StatusMessage::success("Killed Node on port 3000 (PID 100)"));
        assert!(render(&app).join("\n").contains("\u{2713} Killed Node on port 3000"));

        app.set_message(StatusMessage::warning("Process on port 3000 already exited"));
        assert!(render(&app).join("\n").contains("\u{26a0} Process on port 3000"));

        app.set_message(StatusMessage::error("Permission denied killing PID 100. Try sudo."));
        assert!(render(&app).join("\n").contains("\u{2717} Permission denied"));

        app.set_message(StatusMessage::info("Refreshing..."));
        assert!(render(&app).join("\n").contains("Refreshing..."));
    }

    #[test]
    fn test_column_widths_grow_with_content() {
        let mut app = app_with(0);
        app.processes = vec![
            proc_fixture(65535, 123456, "Spring Boot"),
            proc_fixture(80, 1, "Vite"),
        ];

        let lines = render(&app);

        assert!(lines[2].starts_with("  PORT   PID     PROCESS      DIRECTORY"));
        assert!(lines[5].starts_with("  80     1       Vite"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut app = app_with(3);
        app.selected = 2;
        app.mode = Mode::ActionMenu;
        app.set_message(StatusMessage::info("Refreshing..."));

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| draw(f, &app)).unwrap();
        let first = terminal.backend().buffer().clone();

        terminal.draw(|f| draw(f, &app)).unwrap();
        let second = terminal.backend().buffer().clone();

        assert_eq!(first, second);
    }
}
