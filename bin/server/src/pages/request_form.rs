//! Supply request create/edit form.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_params_map;
use stockroom_platform_access::Role;

use crate::app::Protected;
use crate::requests::{create_request, get_request, list_departments, update_request};
use crate::validate::{FieldError, RequestForm, field_message, validate_request_form};

/// Create/edit form for a supply request.
///
/// Served under both `/requests/new` (no `id` param, create mode) and
/// `/requests/:id` (edit mode). Validation runs client-side before
/// submitting; the server repeats it.
#[component]
pub fn RequestFormPage() -> impl IntoView {
    let params = use_params_map();

    let request_id = move || params.get().get("id");
    let editing = move || request_id().is_some();

    let departments = Resource::new(|| (), |_| list_departments());
    let detail = Resource::new(request_id, |id| async move {
        match id {
            Some(id) => get_request(id).await.map(Some),
            None => Ok(None),
        }
    });

    let (item_name, set_item_name) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (quantity, set_quantity) = signal("1".to_string());
    let (department_id, set_department_id) = signal(String::new());
    let (field_errors, set_field_errors) = signal(Vec::<FieldError>::new());
    let (submit_error, set_submit_error) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);
    let (saved, set_saved) = signal(false);

    // Populate the fields once the edit target loads.
    Effect::new(move |_| {
        if let Some(Ok(Some(detail))) = detail.get() {
            set_item_name.set(detail.item_name.clone());
            set_description.set(detail.description.clone().unwrap_or_default());
            set_quantity.set(detail.quantity.to_string());
            set_department_id.set(detail.department_id.clone().unwrap_or_default());
        }
    });

    let error_for = move |field: &'static str| {
        let errors = field_errors.get();
        field_message(&errors, field).map(str::to_string)
    };

    let on_submit = move |_| {
        let form = RequestForm {
            item_name: item_name.get_untracked(),
            description: description.get_untracked(),
            quantity: quantity.get_untracked(),
            department_id: department_id.get_untracked(),
        };

        match validate_request_form(&form) {
            Err(errors) => set_field_errors.set(errors),
            Ok(_) => {
                set_field_errors.set(Vec::new());
                set_submit_error.set(None);
                set_saving.set(true);

                let id = params.get_untracked().get("id");
                spawn_local(async move {
                    let result = match id {
                        Some(id) => update_request(id, form).await,
                        None => create_request(form).await.map(|_| ()),
                    };
                    set_saving.set(false);
                    match result {
                        Ok(()) => set_saved.set(true),
                        Err(e) => set_submit_error.set(Some(e.to_string())),
                    }
                });
            }
        }
    };

    view! {
        <div class="request-form-page">
            <Protected min_role=Role::Employee>
                {move || saved.get().then(|| view! { <Redirect path="/requests"/> })}
                <h1>{move || if editing() { "Edit Supply Request" } else { "New Supply Request" }}</h1>
                <Suspense fallback=move || view! { <p>"Loading..."</p> }>
                    {move || {
                        // Surface a load failure in edit mode; the form body
                        // itself renders from the signals either way.
                        detail.get().and_then(|result| match result {
                            Ok(_) => None,
                            Err(_) => Some(view! {
                                <p class="error">"Failed to load this request."</p>
                            }),
                        })
                    }}
                </Suspense>
                <div class="request-form">
                    <div class="form-row">
                        <label for="item_name">"Item"</label>
                        <input
                            id="item_name"
                            type="text"
                            prop:value=item_name
                            on:input=move |ev| set_item_name.set(event_target_value(&ev))
                        />
                        {move || error_for("item_name").map(|msg| view! {
                            <span class="field-error">{msg}</span>
                        })}
                    </div>
                    <div class="form-row">
                        <label for="description">"Description"</label>
                        <textarea
                            id="description"
                            prop:value=description
                            on:input=move |ev| set_description.set(event_target_value(&ev))
                        ></textarea>
                        {move || error_for("description").map(|msg| view! {
                            <span class="field-error">{msg}</span>
                        })}
                    </div>
                    <div class="form-row">
                        <label for="quantity">"Quantity"</label>
                        <input
                            id="quantity"
                            type="number"
                            prop:value=quantity
                            on:input=move |ev| set_quantity.set(event_target_value(&ev))
                        />
                        {move || error_for("quantity").map(|msg| view! {
                            <span class="field-error">{msg}</span>
                        })}
                    </div>
                    <div class="form-row">
                        <label for="department">"Department"</label>
                        <Suspense fallback=move || view! { <span>"Loading departments..."</span> }>
                            <select
                                id="department"
                                prop:value=department_id
                                on:change=move |ev| set_department_id.set(event_target_value(&ev))
                            >
                                <option value="">"No department"</option>
                                {move || {
                                    departments.get().map(|result| match result {
                                        Ok(items) => items.into_iter().map(|dept| {
                                            let selected = department_id.get_untracked() == dept.id;
                                            view! {
                                                <option value=dept.id selected=selected>{dept.name}</option>
                                            }
                                        }).collect_view().into_any(),
                                        Err(_) => ().into_any(),
                                    })
                                }}
                            </select>
                        </Suspense>
                        {move || error_for("department_id").map(|msg| view! {
                            <span class="field-error">{msg}</span>
                        })}
                    </div>
                    <div class="form-row form-actions">
                        <button
                            class="save-button"
                            disabled=move || saving.get()
                            on:click=on_submit
                        >
                            {move || if saving.get() { "Saving..." } else { "Save request" }}
                        </button>
                        <a href="/requests" class="link-button">"Cancel"</a>
                        {move || submit_error.get().map(|msg| view! {
                            <span class="error">{msg}</span>
                        })}
                    </div>
                </div>
            </Protected>
        </div>
    }
}
