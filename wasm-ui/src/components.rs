//! UI components for the place directory.

use placemap::{CategoryOption, District, FilterSelection, PlaceId};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::labels::{LANGUAGES, Labels};

/// A place as shown in the list and the popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRow {
    pub id: PlaceId,
    pub name: String,
    pub district: String,
    pub categories: Vec<String>,
    pub certified: bool,
}

fn selected_value(e: &Event) -> Option<String> {
    let select: HtmlSelectElement = e.target_unchecked_into();
    let value = select.value();
    (!value.is_empty()).then_some(value)
}

/// Category, district and certification filters.
#[derive(Properties, PartialEq)]
pub struct FilterBarProps {
    pub labels: &'static Labels,
    pub categories: Vec<CategoryOption>,
    pub districts: Vec<District>,
    pub selection: FilterSelection,
    pub on_category: Callback<Option<String>>,
    pub on_district: Callback<Option<String>>,
    pub on_certified: Callback<bool>,
    pub on_clear: Callback<()>,
}

#[function_component(FilterBar)]
pub fn filter_bar(props: &FilterBarProps) -> Html {
    let on_category = {
        let on_category = props.on_category.clone();
        Callback::from(move |e: Event| on_category.emit(selected_value(&e)))
    };
    let on_district = {
        let on_district = props.on_district.clone();
        Callback::from(move |e: Event| on_district.emit(selected_value(&e)))
    };
    let on_certified = {
        let on_certified = props.on_certified.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_certified.emit(input.checked());
        })
    };
    let on_clear = {
        let on_clear = props.on_clear.clone();
        Callback::from(move |_: MouseEvent| on_clear.emit(()))
    };

    let category = props.selection.category.as_deref();
    let district = props.selection.district.as_deref();

    html! {
        <div class="filter-bar">
            <select class="category-filter" onchange={on_category}>
                <option value="" selected={category.is_none()}>{ props.labels.all_categories }</option>
                { for props.categories.iter().map(|c| html! {
                    <option value={c.id.clone()} selected={category == Some(c.id.as_str())}>
                        { &c.name }
                    </option>
                }) }
            </select>
            <select class="district-filter" onchange={on_district}>
                <option value="" selected={district.is_none()}>{ props.labels.all_districts }</option>
                { for props.districts.iter().map(|d| html! {
                    <option value={d.id.clone()} selected={district == Some(d.id.as_str())}>
                        { &d.name }
                    </option>
                }) }
            </select>
            <label class="certified-filter">
                <input
                    type="checkbox"
                    checked={props.selection.certified_only}
                    onchange={on_certified}
                />
                { props.labels.certified_only }
            </label>
            if props.selection.active_count() > 0 {
                <button class="clear-filters" onclick={on_clear}>{ props.labels.clear_filters }</button>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct LanguagePickerProps {
    pub labels: &'static Labels,
    pub current: String,
    pub on_change: Callback<String>,
}

#[function_component(LanguagePicker)]
pub fn language_picker(props: &LanguagePickerProps) -> Html {
    let on_change = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            if let Some(lang) = selected_value(&e) {
                on_change.emit(lang);
            }
        })
    };

    html! {
        <select class="language-picker" aria-label={props.labels.language} onchange={on_change}>
            { for LANGUAGES.iter().map(|(code, name)| html! {
                <option value={*code} selected={props.current == *code}>{ *name }</option>
            }) }
        </select>
    }
}

/// Loading, load failure and list-only notices.
#[derive(Properties, PartialEq)]
pub struct StatusBannerProps {
    pub labels: &'static Labels,
    pub loading: bool,
    pub load_error: Option<String>,
    pub map_error: Option<String>,
}

#[function_component(StatusBanner)]
pub fn status_banner(props: &StatusBannerProps) -> Html {
    if let Some(error) = &props.load_error {
        return html! {
            <div class="status error" role="alert">
                <strong>{ props.labels.load_failed }</strong>
                <span class="detail">{ error }</span>
            </div>
        };
    }
    html! {
        <>
            if props.loading {
                <div class="status loading">{ props.labels.loading }</div>
            }
            if let Some(error) = &props.map_error {
                <div class="status warning" title={error.clone()}>{ props.labels.map_unavailable }</div>
            }
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct PlaceCardProps {
    pub labels: &'static Labels,
    pub row: PlaceRow,
    pub selected: bool,
    pub show_map_link: bool,
    pub on_goto: Callback<PlaceId>,
}

#[function_component(PlaceCard)]
pub fn place_card(props: &PlaceCardProps) -> Html {
    let on_goto = {
        let on_goto = props.on_goto.clone();
        let id = props.row.id;
        Callback::from(move |_: MouseEvent| on_goto.emit(id))
    };
    let row = &props.row;

    html! {
        <li class={classes!("place", props.selected.then_some("selected"))}>
            <h3 class="place-name">
                { &row.name }
                if row.certified {
                    <span class="badge certified">{ props.labels.certified }</span>
                }
            </h3>
            <p class="place-district">{ &row.district }</p>
            <ul class="place-categories">
                { for row.categories.iter().map(|c| html! { <li>{ c }</li> }) }
            </ul>
            if props.show_map_link {
                <button class="goto" onclick={on_goto}>{ props.labels.show_on_map }</button>
            }
        </li>
    }
}

#[derive(Properties, PartialEq)]
pub struct PlaceListProps {
    pub labels: &'static Labels,
    pub rows: Vec<PlaceRow>,
    pub selected: Option<PlaceId>,
    pub show_map_link: bool,
    pub on_goto: Callback<PlaceId>,
}

#[function_component(PlaceList)]
pub fn place_list(props: &PlaceListProps) -> Html {
    if props.rows.is_empty() {
        return html! { <p class="no-results">{ props.labels.no_results }</p> };
    }
    html! {
        <ul class="place-list">
            { for props.rows.iter().map(|row| html! {
                <PlaceCard
                    key={row.id.0}
                    labels={props.labels}
                    row={row.clone()}
                    selected={props.selected == Some(row.id)}
                    show_map_link={props.show_map_link}
                    on_goto={props.on_goto.clone()}
                />
            }) }
        </ul>
    }
}

/// Hidden template cloned into the map popup for the selected place.
#[derive(Properties, PartialEq)]
pub struct PopupTemplateProps {
    pub id: AttrValue,
    pub labels: &'static Labels,
    pub row: Option<PlaceRow>,
}

#[function_component(PopupTemplate)]
pub fn popup_template(props: &PopupTemplateProps) -> Html {
    html! {
        <div id={props.id.clone()} hidden=true>
            if let Some(row) = &props.row {
                <div class="popup">
                    <h3>{ &row.name }</h3>
                    <p>{ &row.district }</p>
                    <p class="popup-categories">{ row.categories.join(", ") }</p>
                    if row.certified {
                        <span class="badge certified">{ props.labels.certified }</span>
                    }
                </div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct InstallToastProps {
    pub labels: &'static Labels,
    pub visible: bool,
    pub on_install: Callback<()>,
    pub on_dismiss: Callback<()>,
}

#[function_component(InstallToast)]
pub fn install_toast(props: &InstallToastProps) -> Html {
    if !props.visible {
        return html! {};
    }
    let on_install = {
        let on_install = props.on_install.clone();
        Callback::from(move |_: MouseEvent| on_install.emit(()))
    };
    let on_dismiss = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(()))
    };

    html! {
        <div class="toast install-toast" role="dialog">
            <span>{ props.labels.install_message }</span>
            <button class="install" onclick={on_install}>{ props.labels.install }</button>
            <button class="dismiss" onclick={on_dismiss}>{ props.labels.not_now }</button>
        </div>
    }
}
