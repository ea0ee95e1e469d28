use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Lesson {
    pub fn new(id: &str, name: &str, color: &str, topics: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    pub fn first_topic(&self) -> Option<&str> {
        self.topics.first().map(String::as_str)
    }

    /// First letter of the name, used as a badge in list views.
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

pub fn default_lessons() -> Vec<Lesson> {
    vec![
        Lesson::new(
            "turkce",
            "Türkçe",
            "bg-indigo-500",
            &[
                "Sözcükte Anlam", "Cümlede Anlam", "Paragrafın Anlam ve Yapısı", "Ses Bilgisi",
                "Yazım Kuralları", "Noktalama İşaretleri", "Sözcükte Yapı (Ek-Kök)",
                "Sözcük Türleri (İsim, Sıfat, Fiil...)", "Cümle Bilgisi (Ögeler-Türler)",
                "Anlatım Bozuklukları", "Sözel Mantık",
            ],
        ),
        Lesson::new(
            "matematik",
            "Matematik",
            "bg-rose-500",
            &[
                "Temel Kavramlar", "Sayı Basamakları", "Bölme ve Bölünebilme", "EBOB-EKOK",
                "Rasyonel Sayılar", "Basit Eşitsizlikler", "Mutlak Değer", "Üslü Sayılar",
                "Köklü Sayılar", "Çarpanlara Ayırma", "I. Dereceden Denklemler", "Oran-Orantı",
                "Sayı-Kesir Problemleri", "Yaş Problemleri", "İşçi-Havuz Problemleri",
                "Hareket Problemleri", "Yüzde-Kar-Zarar Problemleri", "Karışım Problemleri",
                "Grafik Problemleri", "Kümeler ve Kartezyen Çarpım", "Fonksiyonlar",
                "Permütasyon-Kombinasyon", "Olasılık", "Sayısal Mantık",
            ],
        ),
        Lesson::new(
            "geometri",
            "Geometri",
            "bg-amber-500",
            &[
                "Geometrik Kavramlar ve Açılar", "Üçgende Açılar", "Üçgende Alan",
                "Üçgende Benzerlik", "Dik Üçgen ve Trigonometri", "İkizkenar ve Eşkenar Üçgen",
                "Üçgende Açı-Kenar Bağıntıları", "Çokgenler ve Dörtgenler", "Çember ve Daire",
                "Analitik Geometri", "Katı Cisimler",
            ],
        ),
        Lesson::new(
            "tarih",
            "Tarih",
            "bg-emerald-600",
            &[
                "İslamiyet Öncesi Türk Tarihi", "İlk Türk-İslam Devletleri",
                "Türkiye Tarihi (1071-1299)", "Osmanlı Devleti Kuruluş ve Yükselme",
                "Osmanlı Devleti Duraklama, Gerileme ve Dağılma", "Osmanlı Kültür ve Medeniyeti",
                "XX. Yüzyılda Osmanlı Devleti", "Kurtuluş Savaşı Hazırlık Dönemi",
                "Kurtuluş Savaşı Cepheler", "Atatürk İlke ve İnkılapları",
                "Atatürk Dönemi Türk Dış Politikası", "Çağdaş Türk ve Dünya Tarihi",
            ],
        ),
        Lesson::new(
            "cografya",
            "Coğrafya",
            "bg-cyan-600",
            &[
                "Türkiye’nin Coğrafi Konumu", "Türkiye’nin Yerşekilleri",
                "Türkiye’nin İklimi ve Bitki Örtüsü", "Türkiye’de Nüfus ve Yerleşme",
                "Türkiye’de Tarım", "Türkiye’de Hayvancılık",
                "Türkiye’de Madenler ve Enerji Kaynakları", "Türkiye’de Sanayi",
                "Türkiye’de Ulaşım, Ticaret ve Turizm", "Türkiye’nin Bölgesel Coğrafyası",
            ],
        ),
        Lesson::new(
            "vatandaslik",
            "Vatandaşlık",
            "bg-violet-600",
            &[
                "Hukukun Temel Kavramları", "Devlet Biçimleri ve Hükümet Sistemleri",
                "Anayasa Tarihi", "1982 Anayasası Temel İlkeler", "Temel Hak ve Ödevler",
                "Yasama", "Yürütme", "Yargı", "İdare Hukuku", "Güncel Bilgiler",
            ],
        ),
    ]
}
