//! Interface strings per language.

#[derive(Debug, PartialEq, Eq)]
pub struct Labels {
    pub title: &'static str,
    pub language: &'static str,
    pub all_categories: &'static str,
    pub all_districts: &'static str,
    pub certified_only: &'static str,
    pub clear_filters: &'static str,
    pub loading: &'static str,
    pub load_failed: &'static str,
    pub map_unavailable: &'static str,
    pub no_results: &'static str,
    pub certified: &'static str,
    pub show_on_map: &'static str,
    pub install_message: &'static str,
    pub install: &'static str,
    pub not_now: &'static str,
}

const PT: Labels = Labels {
    title: "Mapa de locais",
    language: "Idioma",
    all_categories: "Todas as categorias",
    all_districts: "Todos os distritos",
    certified_only: "Apenas certificados",
    clear_filters: "Limpar filtros",
    loading: "A carregar locais...",
    load_failed: "Não foi possível carregar os locais",
    map_unavailable: "Mapa indisponível, a mostrar apenas a lista",
    no_results: "Nenhum local corresponde aos filtros",
    certified: "Certificado",
    show_on_map: "Ver no mapa",
    install_message: "Instale esta aplicação para a usar offline",
    install: "Instalar",
    not_now: "Agora não",
};

const EN: Labels = Labels {
    title: "Places map",
    language: "Language",
    all_categories: "All categories",
    all_districts: "All districts",
    certified_only: "Certified only",
    clear_filters: "Clear filters",
    loading: "Loading places...",
    load_failed: "Could not load places",
    map_unavailable: "Map unavailable, showing the list only",
    no_results: "No place matches the filters",
    certified: "Certified",
    show_on_map: "Show on map",
    install_message: "Install this app to use it offline",
    install: "Install",
    not_now: "Not now",
};

/// Languages offered by the picker, as `(code, name)`.
pub const LANGUAGES: &[(&str, &str)] = &[("pt", "Português"), ("en", "English")];

impl Labels {
    /// Strings for `lang` (`"en"`, `"en-GB"`...), Portuguese otherwise.
    pub fn for_language(lang: &str) -> &'static Labels {
        let primary = lang.split('-').next().unwrap_or(lang);
        if primary.eq_ignore_ascii_case("en") {
            &EN
        } else {
            &PT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_suffix_is_ignored() {
        assert_eq!(Labels::for_language("en-GB"), &EN);
        assert_eq!(Labels::for_language("EN"), &EN);
    }

    #[test]
    fn test_unknown_language_uses_portuguese() {
        assert_eq!(Labels::for_language("fr"), &PT);
        assert_eq!(Labels::for_language(""), &PT);
    }
}
