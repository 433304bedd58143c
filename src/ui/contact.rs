/// Contact page: the form and its status line
use iced::widget::{button, column, container, text, text_editor, text_input};
use iced::{Element, Length, Task};

use crate::config::AppConfig;
use crate::contact::relay::{RelayClient, SubmitError};
use crate::contact::{ContactForm, FormStatus, Followup};
use crate::ui::after;

#[derive(Debug, Clone)]
pub enum Message {
    NameChanged(String),
    EmailChanged(String),
    SubjectChanged(String),
    MessageEdited(text_editor::Action),
    Submit,
    Finished(Result<(), SubmitError>),
    ClearStatus(u64),
}

#[derive(Default)]
pub struct ContactPage {
    form: ContactForm,
    editor: text_editor::Content,
}

impl ContactPage {
    pub fn update(
        &mut self,
        message: Message,
        config: &AppConfig,
        relay: &RelayClient,
    ) -> Task<Message> {
        match message {
            Message::NameChanged(name) => self.form.fields.name = name,
            Message::EmailChanged(email) => self.form.fields.email = email,
            Message::SubjectChanged(subject) => self.form.fields.subject = subject,
            Message::MessageEdited(action) => {
                self.editor.perform(action);
                self.form.fields.message = self.editor.text();
            }
            Message::Submit => {
                if let Some(payload) = self.form.submit(&config.access_key) {
                    return Task::perform(relay.clone().submit(payload), Message::Finished);
                }
            }
            Message::Finished(result) => {
                let followup = self.form.finish(
                    result,
                    config.access_key_is_placeholder(),
                    &config.contact_email,
                );
                if let Followup::ClearStatusLater(generation) = followup {
                    self.editor = text_editor::Content::new();
                    return after(config.status_clear_delay(), Message::ClearStatus(generation));
                }
            }
            Message::ClearStatus(generation) => self.form.clear_status(generation),
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fields = &self.form.fields;

        let submit = button(text("Send Message"))
            .on_press_maybe(self.form.can_submit().then_some(Message::Submit))
            .padding([8, 20]);

        let status = text(self.form.status().text()).size(14).style(match self.form.status() {
            FormStatus::Sent => text::success,
            FormStatus::Failed(_) => text::danger,
            FormStatus::Idle | FormStatus::Sending => text::default,
        });

        let form = column![
            text("Get in touch").size(28),
            text_input("Name", &fields.name)
                .on_input(Message::NameChanged)
                .padding(10),
            text_input("Email", &fields.email)
                .on_input(Message::EmailChanged)
                .padding(10),
            text_input("Subject", &fields.subject)
                .on_input(Message::SubjectChanged)
                .padding(10),
            text("Message").size(14),
            text_editor(&self.editor)
                .on_action(Message::MessageEdited)
                .height(180),
            submit,
            status,
        ]
        .spacing(14)
        .max_width(560);

        container(form)
            .padding(40)
            .center_x(Length::Fill)
            .into()
    }
}
